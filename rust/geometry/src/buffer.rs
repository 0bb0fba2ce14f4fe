// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh buffering: tolerance-expanded copies of wall solids.
//!
//! Each vertex is pushed outward along its vertex normal by the buffer
//! distance. Topology is untouched, so the result is only as sound as the
//! input; no repair or retriangulation is attempted.

use crate::bounds::BoundingBox;
use crate::entities::Wall;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::Vector3;

/// Volumes at or below this are treated as flat
const MIN_ENCLOSED_VOLUME: f64 = 1e-15;

/// A wall mesh offset outward by a fixed distance.
///
/// Derived and ephemeral: owned by whoever built it, never written back to
/// the wall it came from.
#[derive(Debug, Clone)]
pub struct BufferedMesh {
    mesh: Mesh,
    bounds: BoundingBox,
    distance: f64,
}

impl BufferedMesh {
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Offset distance this mesh was built with
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

/// Outward unit normals per vertex.
///
/// Each adjacent face contributes its unit normal weighted by the corner
/// angle it makes at the vertex, so the result does not depend on how a
/// planar region happens to be triangulated. Normals are flipped as a whole
/// when the mesh winding is inverted (negative signed volume).
///
/// Entries are `None` for vertices no non-degenerate face touches.
fn vertex_normals(mesh: &Mesh) -> Vec<Option<Vector3<f64>>> {
    let mut sums = vec![Vector3::zeros(); mesh.vertex_count()];
    let mut touched = vec![false; mesh.vertex_count()];

    for i in 0..mesh.triangle_count() {
        let corners = mesh.triangle_indices(i);
        let Some(normal) = mesh.triangle(i).normal() else {
            continue;
        };

        for k in 0..3 {
            let here = mesh.vertex(corners[k]);
            let next = mesh.vertex(corners[(k + 1) % 3]);
            let prev = mesh.vertex(corners[(k + 2) % 3]);
            let angle = (next - here).angle(&(prev - here));
            if angle.is_finite() {
                sums[corners[k]] += normal * angle;
                touched[corners[k]] = true;
            }
        }
    }

    let orientation = if mesh.signed_volume() < 0.0 { -1.0 } else { 1.0 };

    sums.into_iter()
        .zip(touched)
        .map(|(sum, touched)| {
            if touched {
                sum.try_normalize(f64::EPSILON).map(|n| n * orientation)
            } else {
                None
            }
        })
        .collect()
}

/// Offset `mesh` outward by `distance` along its vertex normals.
///
/// `distance` must be finite and non-negative and the mesh buffers must be
/// consistent (see [`Mesh::validate`]); zero returns the mesh unchanged.
/// Meshes without faces, enclosing no volume, or with a face-referenced
/// vertex lacking a defined normal cannot be buffered.
pub fn buffer_mesh(mesh: &Mesh, distance: f64) -> Result<BufferedMesh> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(Error::invalid(format!(
            "buffer distance must be finite and non-negative, got {}",
            distance
        )));
    }

    mesh.validate()?;

    if mesh.triangle_count() == 0 {
        return Err(Error::construction("", "mesh has no faces"));
    }

    if mesh.signed_volume().abs() <= MIN_ENCLOSED_VOLUME {
        return Err(Error::construction("", "mesh encloses no volume"));
    }

    let normals = vertex_normals(mesh);
    let mut referenced = vec![false; mesh.vertex_count()];
    for &i in &mesh.indices {
        referenced[i as usize] = true;
    }

    let mut buffered = mesh.clone();

    for (index, normal) in normals.iter().enumerate() {
        if !referenced[index] {
            continue;
        }
        let normal = normal.ok_or_else(|| {
            Error::construction("", format!("vertex {} has no defined normal", index))
        })?;
        if distance > 0.0 {
            let moved = mesh.vertex(index) + normal * distance;
            buffered.set_vertex(index, moved);
        }
    }

    if buffered.positions.iter().any(|c| !c.is_finite()) {
        return Err(Error::construction("", "offset produced non-finite coordinates"));
    }

    let bounds = buffered
        .bounds()
        .ok_or_else(|| Error::construction("", "mesh has no vertices"))?;

    tracing::trace!(
        vertices = buffered.vertex_count(),
        triangles = buffered.triangle_count(),
        distance,
        "Buffered mesh"
    );

    Ok(BufferedMesh {
        mesh: buffered,
        bounds,
        distance,
    })
}

impl Wall {
    /// Buffer this wall's mesh, tagging failures with the wall id
    pub fn buffered(&self, distance: f64) -> Result<BufferedMesh> {
        buffer_mesh(self.mesh(), distance).map_err(|e| e.for_wall(self.id()))
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

/// Triangle defined by three corner positions
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized normal (length is twice the area)
    #[inline]
    pub fn scaled_normal(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit normal, `None` for a degenerate triangle
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.scaled_normal().try_normalize(f64::EPSILON)
    }
}

/// Indexed triangle mesh in double precision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Build a mesh from flat vertex and index buffers.
    ///
    /// Fails under the same conditions as [`Mesh::validate`].
    pub fn from_buffers(positions: Vec<f64>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self { positions, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Check buffer consistency.
    ///
    /// Rejects buffers whose lengths are not multiples of three, non-finite
    /// coordinates, and indices that reference missing vertices.
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(Error::invalid(format!(
                "vertex buffer length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::invalid(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(pos) = self.positions.iter().position(|c| !c.is_finite()) {
            return Err(Error::invalid(format!(
                "non-finite coordinate at vertex {}",
                pos / 3
            )));
        }
        let vertex_count = self.vertex_count();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::invalid(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }
        Ok(())
    }

    /// Build a closed box with outward-facing winding.
    /// Returns a mesh with 12 triangles (2 per face, 6 faces)
    pub fn from_aabb(min: Point3<f64>, max: Point3<f64>) -> Self {
        let mut mesh = Self::with_capacity(8, 36);

        mesh.add_vertex(Point3::new(min.x, min.y, min.z)); // 0
        mesh.add_vertex(Point3::new(max.x, min.y, min.z)); // 1
        mesh.add_vertex(Point3::new(max.x, max.y, min.z)); // 2
        mesh.add_vertex(Point3::new(min.x, max.y, min.z)); // 3
        mesh.add_vertex(Point3::new(min.x, min.y, max.z)); // 4
        mesh.add_vertex(Point3::new(max.x, min.y, max.z)); // 5
        mesh.add_vertex(Point3::new(max.x, max.y, max.z)); // 6
        mesh.add_vertex(Point3::new(min.x, max.y, max.z)); // 7

        // -Z
        mesh.add_triangle(0, 2, 1);
        mesh.add_triangle(0, 3, 2);
        // +Z
        mesh.add_triangle(4, 5, 6);
        mesh.add_triangle(4, 6, 7);
        // -X
        mesh.add_triangle(0, 4, 7);
        mesh.add_triangle(0, 7, 3);
        // +X
        mesh.add_triangle(1, 2, 6);
        mesh.add_triangle(1, 6, 5);
        // -Y
        mesh.add_triangle(0, 1, 5);
        mesh.add_triangle(0, 5, 4);
        // +Y
        mesh.add_triangle(3, 7, 6);
        mesh.add_triangle(3, 6, 2);

        mesh
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.push(position.x);
        self.positions.push(position.y);
        self.positions.push(position.z);
        index
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Position of vertex `index`
    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<f64> {
        let base = index * 3;
        Point3::new(
            self.positions[base],
            self.positions[base + 1],
            self.positions[base + 2],
        )
    }

    /// Overwrite the position of vertex `index`
    #[inline]
    pub fn set_vertex(&mut self, index: usize, position: Point3<f64>) {
        let base = index * 3;
        self.positions[base] = position.x;
        self.positions[base + 1] = position.y;
        self.positions[base + 2] = position.z;
    }

    /// Corner indices of triangle `index`
    #[inline]
    pub fn triangle_indices(&self, index: usize) -> [usize; 3] {
        let base = index * 3;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }

    /// Triangle `index` as positions
    #[inline]
    pub fn triangle(&self, index: usize) -> Triangle {
        let [a, b, c] = self.triangle_indices(index);
        Triangle::new(self.vertex(a), self.vertex(b), self.vertex(c))
    }

    /// Iterate over all triangles
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }

    /// Iterate over all vertex positions
    pub fn vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices())
    }

    /// Signed volume via the tetrahedron method.
    ///
    /// Positive for a closed mesh whose triangles wind counter-clockwise seen
    /// from outside, negative when the winding is inverted.
    pub fn signed_volume(&self) -> f64 {
        let volume: f64 = self
            .triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum();
        volume / 6.0
    }

    /// Merge vertices with bit-identical positions.
    ///
    /// Triangle soups (one vertex triple per face) become indexed meshes, so
    /// per-vertex normals average over every face meeting at a corner.
    pub fn welded(&self) -> Mesh {
        let mut remap: FxHashMap<[u64; 3], u32> = FxHashMap::default();
        let mut old_to_new = Vec::with_capacity(self.vertex_count());
        let mut welded = Mesh::with_capacity(self.vertex_count(), self.indices.len());

        for p in self.vertices() {
            // -0.0 and 0.0 are the same point
            let key = [
                (p.x + 0.0).to_bits(),
                (p.y + 0.0).to_bits(),
                (p.z + 0.0).to_bits(),
            ];
            let index = *remap.entry(key).or_insert_with(|| welded.add_vertex(p));
            old_to_new.push(index);
        }

        welded
            .indices
            .extend(self.indices.iter().map(|&i| old_to_new[i as usize]));
        welded
    }
}

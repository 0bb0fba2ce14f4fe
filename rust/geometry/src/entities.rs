// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated match inputs: analytical surfaces and architectural walls.
//!
//! Both are immutable once constructed. Construction is where malformed input
//! is rejected, so the geometry routines downstream can rely on finite
//! coordinates and a well-defined bounding box.

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::Point3;

/// Relative threshold below which a boundary is treated as collinear
const COLLINEAR_EPSILON: f64 = 1e-12;

/// Planar analytical panel described by its boundary points
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    id: String,
    points: Vec<Point3<f64>>,
    bounds: BoundingBox,
}

impl Surface {
    /// Create a surface from its ordered boundary points.
    ///
    /// Requires at least three finite points that are not all collinear.
    pub fn new(id: impl Into<String>, points: Vec<Point3<f64>>) -> Result<Self> {
        let id = id.into();

        if points.len() < 3 {
            return Err(Error::invalid(format!(
                "surface '{}' has {} points, at least 3 are required",
                id,
                points.len()
            )));
        }

        if points
            .iter()
            .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(Error::invalid(format!(
                "surface '{}' has non-finite coordinates",
                id
            )));
        }

        let bounds = BoundingBox::from_points(points.iter().copied())
            .ok_or_else(|| Error::invalid(format!("surface '{}' has no points", id)))?;

        if bounds.spanned_axes() < 2 || is_collinear(&points, bounds.diagonal()) {
            return Err(Error::invalid(format!(
                "surface '{}' is degenerate: boundary points are collinear",
                id
            )));
        }

        Ok(Self { id, points, bounds })
    }

    /// Create a surface from a flat `[x0, y0, z0, x1, ...]` coordinate array
    pub fn from_flat(id: impl Into<String>, coords: &[f64]) -> Result<Self> {
        let id = id.into();
        if coords.len() % 3 != 0 {
            return Err(Error::invalid(format!(
                "surface '{}' coordinate array length {} is not a multiple of 3",
                id,
                coords.len()
            )));
        }
        let points = coords
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        Self::new(id, points)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

fn is_collinear(points: &[Point3<f64>], scale: f64) -> bool {
    let threshold = COLLINEAR_EPSILON * scale * scale;
    let origin = points[0];

    let Some(direction) = points[1..]
        .iter()
        .map(|p| p - origin)
        .find(|d| d.norm() > COLLINEAR_EPSILON * scale)
    else {
        return true;
    };

    !points[1..]
        .iter()
        .any(|p| direction.cross(&(p - origin)).norm() > threshold)
}

/// Architectural solid described by a closed triangle mesh
#[derive(Debug, Clone)]
pub struct Wall {
    id: String,
    mesh: Mesh,
    bounds: BoundingBox,
}

impl Wall {
    /// Create a wall from a triangle mesh.
    ///
    /// Coincident vertices are welded. A mesh without faces is accepted here
    /// (its bounds are still defined) and rejected later when buffering.
    pub fn new(id: impl Into<String>, mesh: Mesh) -> Result<Self> {
        let id = id.into();
        let mesh = Mesh::from_buffers(mesh.positions, mesh.indices)
            .map_err(|e| match e {
                Error::InvalidArgument(msg) => Error::invalid(format!("wall '{}': {}", id, msg)),
                other => other,
            })?
            .welded();

        let bounds = mesh
            .bounds()
            .ok_or_else(|| Error::invalid(format!("wall '{}' has no vertices", id)))?;

        Ok(Self { id, mesh, bounds })
    }

    /// Create a wall from flat vertex and triangle index buffers
    pub fn from_buffers(
        id: impl Into<String>,
        positions: Vec<f64>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        Self::new(id, Mesh { positions, indices })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn surface_bounds() {
        let s = Surface::new("s1", unit_square()).unwrap();
        assert_eq!(s.id(), "s1");
        assert_eq!(s.points().len(), 4);
        assert_eq!(s.bounds().min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(s.bounds().max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn surface_needs_three_points() {
        let err = Surface::new("s", unit_square()[..2].to_vec()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn surface_rejects_non_finite() {
        let mut pts = unit_square();
        pts[2].x = f64::INFINITY;
        assert!(matches!(
            Surface::new("s", pts),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn surface_rejects_collinear_points() {
        // Diagonal line spans two axes but has no area
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        assert!(Surface::new("line", pts).is_err());

        let same = vec![Point3::new(1.0, 1.0, 1.0); 4];
        assert!(Surface::new("point", same).is_err());
    }

    #[test]
    fn surface_from_flat() {
        let s = Surface::from_flat("flat", &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 0.0, 3.0]).unwrap();
        assert_eq!(s.points().len(), 3);
        assert_eq!(s.bounds().max, Point3::new(2.0, 0.0, 3.0));
        assert!(Surface::from_flat("bad", &[0.0, 1.0]).is_err());
    }

    #[test]
    fn wall_welds_and_bounds() {
        let mesh = Mesh::from_aabb(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.2, 3.0));
        let wall = Wall::new("w1", mesh).unwrap();
        assert_eq!(wall.id(), "w1");
        assert_eq!(wall.mesh().vertex_count(), 8);
        assert_eq!(wall.bounds().min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(wall.bounds().max, Point3::new(1.0, 0.2, 3.0));
    }

    #[test]
    fn wall_rejects_bad_buffers() {
        assert!(Wall::from_buffers("w", vec![], vec![]).is_err());
        assert!(Wall::from_buffers("w", vec![0.0; 9], vec![0, 1, 9]).is_err());
    }

    #[test]
    fn wall_without_faces_is_constructible() {
        let wall = Wall::from_buffers("w", vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], vec![]).unwrap();
        assert_eq!(wall.mesh().triangle_count(), 0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-solid classification against closed triangle meshes.
//!
//! Points within [`BOUNDARY_EPSILON`] of any triangle are on the boundary and
//! count as contained. Everything else is decided by ray-parity: rays are cast
//! in three fixed, non-axis-aligned directions and the majority vote wins, so
//! a single ray grazing an edge or vertex cannot flip the result.

use crate::bounds::BoundingBox;
use crate::buffer::BufferedMesh;
use crate::error::Result;
use crate::mesh::{Mesh, Triangle};
use nalgebra::{Point3, Vector3};

/// Distance within which a point is considered on the mesh surface
pub const BOUNDARY_EPSILON: f64 = 1e-9;

const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [0.8017, 0.4521, 0.3912],
    [-0.3377, 0.8829, 0.3265],
    [0.2113, -0.3571, 0.9098],
];

/// Where a point lies relative to a closed solid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClass {
    Inside,
    Boundary,
    Outside,
}

impl PointClass {
    /// Closed containment: boundary points are contained
    #[inline]
    pub fn is_contained(self) -> bool {
        !matches!(self, PointClass::Outside)
    }
}

/// Classify `point` against a closed mesh with precomputed `bounds`.
///
/// Fails with `InvalidArgument` when the mesh buffers are inconsistent.
pub fn classify_point(
    mesh: &Mesh,
    bounds: &BoundingBox,
    point: &Point3<f64>,
) -> Result<PointClass> {
    mesh.validate()?;
    Ok(classify_checked(mesh, bounds, point))
}

/// Classification for meshes already known to be consistent
fn classify_checked(mesh: &Mesh, bounds: &BoundingBox, point: &Point3<f64>) -> PointClass {
    if !bounds.contains_point(point, BOUNDARY_EPSILON) {
        return PointClass::Outside;
    }

    let directions = RAY_DIRECTIONS.map(|d| Vector3::new(d[0], d[1], d[2]));
    let mut crossings = [0usize; 3];
    let boundary_sq = BOUNDARY_EPSILON * BOUNDARY_EPSILON;

    for tri in mesh.triangles() {
        if (closest_point_on_triangle(point, &tri) - point).norm_squared() <= boundary_sq {
            return PointClass::Boundary;
        }
        for (count, dir) in crossings.iter_mut().zip(&directions) {
            if ray_intersects_triangle(point, dir, &tri) {
                *count += 1;
            }
        }
    }

    let inside_votes = crossings.iter().filter(|&&c| c % 2 == 1).count();
    if inside_votes >= 2 {
        PointClass::Inside
    } else {
        PointClass::Outside
    }
}

/// Whether a single point is inside or on the boundary of the solid
#[inline]
pub fn contains_point(solid: &BufferedMesh, point: &Point3<f64>) -> bool {
    // Buffered meshes are validated when built
    classify_checked(solid.mesh(), solid.bounds(), point).is_contained()
}

/// Whether every point is inside or on the boundary of the solid.
///
/// Stops at the first point that is outside.
pub fn contains(solid: &BufferedMesh, points: &[Point3<f64>]) -> bool {
    points.iter().all(|p| contains_point(solid, p))
}

/// Möller–Trumbore ray-triangle intersection test.
///
/// Casts a ray from `origin` along `dir` and tests if it hits the
/// triangle strictly in front of the origin.
fn ray_intersects_triangle(origin: &Point3<f64>, dir: &Vector3<f64>, tri: &Triangle) -> bool {
    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;

    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < 1e-12 {
        return false; // ray parallel to triangle
    }

    let f = 1.0 / a;
    let s = origin - tri.v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);

    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    let t = f * edge2.dot(&q);
    t > 1e-12
}

/// Closest point to `p` on a triangle (Voronoi region walk)
fn closest_point_on_triangle(p: &Point3<f64>, tri: &Triangle) -> Point3<f64> {
    let (a, b, c) = (tri.v0, tri.v1, tri.v2);
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::buffer_mesh;
    use approx::assert_relative_eq;

    fn unit_box() -> BufferedMesh {
        let mesh = Mesh::from_aabb(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        buffer_mesh(&mesh, 0.0).unwrap()
    }

    #[test]
    fn center_is_inside() {
        let solid = unit_box();
        assert_eq!(
            classify_point(solid.mesh(), solid.bounds(), &Point3::new(0.5, 0.5, 0.5)).unwrap(),
            PointClass::Inside
        );
        assert!(contains_point(&solid, &Point3::new(0.1, 0.9, 0.2)));
    }

    #[test]
    fn outside_points_on_each_axis() {
        let solid = unit_box();
        for p in [
            Point3::new(-0.5, 0.5, 0.5),
            Point3::new(1.5, 0.5, 0.5),
            Point3::new(0.5, -0.5, 0.5),
            Point3::new(0.5, 1.5, 0.5),
            Point3::new(0.5, 0.5, -0.5),
            Point3::new(0.5, 0.5, 1.5),
            Point3::new(10.0, 10.0, 10.0),
        ] {
            assert!(!contains_point(&solid, &p), "{:?} should be outside", p);
        }
    }

    #[test]
    fn gap_between_disjoint_parts_is_outside() {
        let mut mesh = Mesh::from_aabb(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let second = Mesh::from_aabb(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
        let offset = mesh.vertex_count() as u32;
        mesh.positions.extend_from_slice(&second.positions);
        mesh.indices.extend(second.indices.iter().map(|&i| i + offset));
        let solid = buffer_mesh(&mesh, 0.0).unwrap();

        // Inside the combined bounds but between the two boxes
        assert!(!contains_point(&solid, &Point3::new(1.5, 0.5, 0.5)));
        assert!(contains_point(&solid, &Point3::new(0.5, 0.5, 0.5)));
        assert!(contains_point(&solid, &Point3::new(2.5, 0.5, 0.5)));
    }

    #[test]
    fn face_edge_and_corner_points_are_boundary() {
        let solid = unit_box();
        for p in [
            Point3::new(0.5, 0.5, 0.0),
            Point3::new(1.0, 0.3, 0.7),
            Point3::new(0.5, 0.5, 1.0),
            Point3::new(1.0, 1.0, 0.5),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ] {
            assert_eq!(
                classify_point(solid.mesh(), solid.bounds(), &p).unwrap(),
                PointClass::Boundary,
                "{:?}",
                p
            );
            assert!(contains_point(&solid, &p));
        }
    }

    #[test]
    fn points_on_internal_diagonals_are_inside() {
        // Rays from these points pass near the box's triangulation diagonals
        let solid = unit_box();
        for p in [
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(0.25, 0.25, 0.25),
            Point3::new(0.75, 0.75, 0.75),
            Point3::new(0.5, 0.25, 0.5),
        ] {
            assert!(contains_point(&solid, &p), "{:?}", p);
        }
    }

    #[test]
    fn contains_requires_every_point() {
        let solid = unit_box();
        let inside = vec![Point3::new(0.2, 0.2, 0.2), Point3::new(0.8, 0.8, 0.8)];
        assert!(contains(&solid, &inside));

        let mixed = vec![Point3::new(0.2, 0.2, 0.2), Point3::new(1.8, 0.8, 0.8)];
        assert!(!contains(&solid, &mixed));
        assert!(contains(&solid, &[]));
    }

    #[test]
    fn buffering_absorbs_small_offsets() {
        let mesh = Mesh::from_aabb(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let just_outside = Point3::new(1.005, 0.5, 0.5);

        let tight = buffer_mesh(&mesh, 0.0).unwrap();
        assert!(!contains_point(&tight, &just_outside));

        let loose = buffer_mesh(&mesh, 0.01).unwrap();
        assert!(contains_point(&loose, &just_outside));
    }

    #[test]
    fn inverted_winding_classifies_the_same() {
        let mut mesh = Mesh::from_aabb(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        for tri in mesh.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        let solid = buffer_mesh(&mesh, 0.0).unwrap();
        assert!(contains_point(&solid, &Point3::new(0.5, 0.5, 0.5)));
        assert!(!contains_point(&solid, &Point3::new(2.0, 0.5, 0.5)));
    }

    #[test]
    fn closest_point_regions() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        // Above the face
        let c = closest_point_on_triangle(&Point3::new(0.2, 0.2, 5.0), &tri);
        assert_relative_eq!(c, Point3::new(0.2, 0.2, 0.0));
        // Past vertex a
        let c = closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.0), &tri);
        assert_relative_eq!(c, Point3::new(0.0, 0.0, 0.0));
        // Beside the hypotenuse
        let c = closest_point_on_triangle(&Point3::new(1.0, 1.0, 0.0), &tri);
        assert_relative_eq!(c, Point3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn ray_hits_only_in_front() {
        let tri = Triangle::new(
            Point3::new(0.0, -1.0, -1.0),
            Point3::new(0.0, 1.0, -1.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        let dir = Vector3::new(1.0, 0.0, 0.0);
        assert!(ray_intersects_triangle(&Point3::new(-1.0, 0.0, 0.0), &dir, &tri));
        assert!(!ray_intersects_triangle(&Point3::new(1.0, 0.0, 0.0), &dir, &tri));
    }

    #[test]
    fn inconsistent_mesh_is_rejected() {
        let mut mesh = Mesh::from_aabb(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let bounds = mesh.bounds().unwrap();
        mesh.add_triangle(0, 1, 42);
        assert!(classify_point(&mesh, &bounds, &Point3::new(0.5, 0.5, 0.5)).is_err());
    }
}

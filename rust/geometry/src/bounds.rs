// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes and candidate pruning.
//!
//! Bounding-box overlap is the cheap necessary condition checked before any
//! containment test. A wall whose tolerance-expanded box does not meet the
//! surface's expanded box can never contain that surface, so it is skipped.

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box, `min <= max` on every axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` when there are none
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;

        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some(Self { min, max })
    }

    /// Box grown by `amount` on every side
    #[inline]
    pub fn expanded(&self, amount: f64) -> Self {
        let delta = Vector3::repeat(amount);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Closed-interval overlap on all three axes
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Point inside the box grown by `tolerance`
    #[inline]
    pub fn contains_point(&self, p: &Point3<f64>, tolerance: f64) -> bool {
        p.x >= self.min.x - tolerance
            && p.x <= self.max.x + tolerance
            && p.y >= self.min.y - tolerance
            && p.y <= self.max.y + tolerance
            && p.z >= self.min.z - tolerance
            && p.z <= self.max.z + tolerance
    }

    #[inline]
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.extent().norm()
    }

    /// Number of axes with a strictly positive extent
    pub fn spanned_axes(&self) -> usize {
        self.extent().iter().filter(|&&e| e > 0.0).count()
    }
}

/// Candidate pruning test.
///
/// Grows both boxes by `tolerance` and reports whether they intersect. Never
/// returns `false` for a pair whose containment test could succeed at the
/// same tolerance; false positives are resolved by the exact test.
#[inline]
pub fn may_overlap(surface: &BoundingBox, wall: &BoundingBox, tolerance: f64) -> bool {
    surface
        .expanded(tolerance)
        .intersects(&wall.expanded(tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min: [f64; 3], max: [f64; 3]) -> BoundingBox {
        BoundingBox::new(Point3::from(min), Point3::from(max))
    }

    #[test]
    fn from_points_tracks_extremes() {
        let b = BoundingBox::from_points(vec![
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 4.0, 0.5),
            Point3::new(0.0, 0.0, 3.0),
        ])
        .unwrap();
        assert_eq!(b.min, Point3::new(-1.0, -2.0, 0.5));
        assert_eq!(b.max, Point3::new(1.0, 4.0, 3.0));
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn overlap_with_tolerance() {
        let surface = bbox([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        let wall = bbox([1.1, 0.0, -0.1], [2.0, 1.0, 0.1]);

        assert!(!may_overlap(&surface, &wall, 0.0));
        assert!(!may_overlap(&surface, &wall, 0.04));
        // Both boxes grow, so the 0.1 gap is closed by 0.06
        assert!(may_overlap(&surface, &wall, 0.06));
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = bbox([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = bbox([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(may_overlap(&a, &b, 0.0));
    }

    #[test]
    fn separated_on_single_axis() {
        let a = bbox([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = bbox([0.0, 0.0, 5.0], [1.0, 1.0, 6.0]);
        assert!(!may_overlap(&a, &b, 1.0));
        assert!(may_overlap(&a, &b, 2.0));
    }

    #[test]
    fn spanned_axes_of_planar_box() {
        assert_eq!(bbox([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]).spanned_axes(), 2);
        assert_eq!(bbox([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]).spanned_axes(), 1);
        assert_eq!(bbox([2.0, 2.0, 2.0], [2.0, 2.0, 2.0]).spanned_axes(), 0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interior sampling of surfaces.
//!
//! A regular lattice over the surface's bounding box stands in for the
//! whole planar region when checking it lies inside a solid.

use crate::bounds::BoundingBox;
use crate::entities::Surface;
use crate::error::{Error, Result};
use nalgebra::Point3;

/// Lattice points per axis used when no resolution is configured
pub const DEFAULT_SAMPLE_RESOLUTION: usize = 5;

/// `count` evenly spaced values from `start` to `end`, both inclusive
fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = (end - start) / (count - 1) as f64;
    (0..count).map(move |i| {
        if i + 1 == count {
            end
        } else {
            start + step * i as f64
        }
    })
}

/// `resolution³` lattice points spanning `bounds` inclusively on all axes
pub fn lattice(bounds: &BoundingBox, resolution: usize) -> Result<Vec<Point3<f64>>> {
    if resolution < 2 {
        return Err(Error::invalid(format!(
            "sample resolution must be at least 2, got {}",
            resolution
        )));
    }

    let too_large = || Error::invalid(format!("sample resolution {} is too large", resolution));
    let count = resolution.checked_pow(3).ok_or_else(too_large)?;
    let mut points = Vec::new();
    points.try_reserve_exact(count).map_err(|_| too_large())?;

    let xs: Vec<f64> = linspace(bounds.min.x, bounds.max.x, resolution).collect();
    let ys: Vec<f64> = linspace(bounds.min.y, bounds.max.y, resolution).collect();
    let zs: Vec<f64> = linspace(bounds.min.z, bounds.max.z, resolution).collect();

    for &x in &xs {
        for &y in &ys {
            for &z in &zs {
                points.push(Point3::new(x, y, z));
            }
        }
    }
    Ok(points)
}

/// Interior sample points of a surface.
///
/// Deterministic for a given surface and resolution.
pub fn sample_interior(surface: &Surface, resolution: usize) -> Result<Vec<Point3<f64>>> {
    lattice(surface.bounds(), resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Surface {
        Surface::new(
            "s",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn default_resolution_yields_125_points() {
        let points = sample_interior(&square(), DEFAULT_SAMPLE_RESOLUTION).unwrap();
        assert_eq!(points.len(), 125);
    }

    #[test]
    fn lattice_spans_bounds_inclusively() {
        let points = sample_interior(&square(), 5).unwrap();
        assert!(points.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(points.contains(&Point3::new(1.0, 1.0, 0.0)));
        assert!(points.contains(&Point3::new(0.25, 0.75, 0.0)));
        assert!(points.iter().all(|p| square().bounds().contains_point(p, 0.0)));
    }

    #[test]
    fn sampling_is_deterministic() {
        let a = sample_interior(&square(), 4).unwrap();
        let b = sample_interior(&square(), 4).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn resolution_below_two_is_rejected() {
        assert!(sample_interior(&square(), 1).is_err());
        assert!(sample_interior(&square(), 0).is_err());
        assert_eq!(sample_interior(&square(), 2).unwrap().len(), 8);
    }

    #[test]
    fn endpoints_are_exact() {
        let values: Vec<f64> = linspace(0.1, 0.7, 7).collect();
        assert_eq!(values[0], 0.1);
        assert_eq!(values[6], 0.7);
    }

    #[test]
    fn oversized_resolution_is_rejected() {
        // Cube overflows usize
        assert!(matches!(
            sample_interior(&square(), 1 << 22),
            Err(Error::InvalidArgument(_))
        ));
        // Cube fits, the allocation does not
        assert!(matches!(
            sample_interior(&square(), 1 << 20),
            Err(Error::InvalidArgument(_))
        ));
    }
}

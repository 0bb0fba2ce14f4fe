// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wallmatch Geometry
//!
//! Geometry primitives for matching analytical surfaces against wall solids:
//! validated entities, tolerance buffering of closed triangle meshes,
//! interior sampling, point-in-solid containment and bounding-box pruning.
//! Uses nalgebra for all vector math.

pub mod bounds;
pub mod buffer;
pub mod containment;
pub mod entities;
pub mod error;
pub mod mesh;
pub mod sampling;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use bounds::{may_overlap, BoundingBox};
pub use buffer::{buffer_mesh, BufferedMesh};
pub use containment::{classify_point, contains, contains_point, PointClass, BOUNDARY_EPSILON};
pub use entities::{Surface, Wall};
pub use error::{Error, Result};
pub use mesh::{Mesh, Triangle};
pub use sampling::{sample_interior, DEFAULT_SAMPLE_RESOLUTION};

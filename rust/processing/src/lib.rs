// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface-to-wall matching pipeline.
//!
//! Assigns each analytical surface to the first architectural wall that
//! contains it within a buffer tolerance, running surfaces in parallel on a
//! bounded worker pool. Shared by any host that needs the matching step;
//! logging goes through `tracing` and is left to the host to subscribe to.

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod result;

pub use cancel::CancellationToken;
pub use config::{LengthUnit, MatchConfig};
pub use engine::{match_surfaces, SurfaceWallMatcher};
pub use error::{Error, Result};
pub use model::{extract_surfaces, extract_walls, load_inputs, validate_structural_model};
pub use result::{Assignment, MatchResult, SurfaceMatch, UNMATCHED};

pub use wallmatch_geometry::{Surface, Wall};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed caller input: degenerate surface, negative distance,
    /// non-finite coordinates, out-of-range indices.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A wall mesh could not be buffered or classified.
    #[error("Geometry construction failed for wall '{wall}': {reason}")]
    GeometryConstruction { wall: String, reason: String },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn construction(wall: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::GeometryConstruction {
            wall: wall.into(),
            reason: reason.into(),
        }
    }

    /// Attach a wall id to a construction failure raised without one.
    pub fn for_wall(self, wall_id: &str) -> Self {
        match self {
            Error::GeometryConstruction { wall, reason } if wall.is_empty() => {
                Error::GeometryConstruction {
                    wall: wall_id.to_string(),
                    reason,
                }
            }
            other => other,
        }
    }

    /// Construction failures only disqualify one candidate wall; everything
    /// else is a structural input problem.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::GeometryConstruction { .. })
    }
}

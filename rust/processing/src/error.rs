// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for matching runs.

use thiserror::Error;

/// Result type for matching runs
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a matching run.
///
/// A run either completes with a total result or fails with exactly one of
/// these; partial results are never returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] wallmatch_geometry::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Nothing to match: no {0} supplied")]
    EmptyInput(&'static str),

    #[error("Matching run was cancelled")]
    Cancelled,

    #[error("Matching run exceeded its deadline after {elapsed_ms} ms")]
    DeadlineExceeded { elapsed_ms: u128 },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl Error {
    /// Whether this error stems from malformed caller input
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::Geometry(wallmatch_geometry::Error::InvalidArgument(_))
        )
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(err.to_string())
    }
}

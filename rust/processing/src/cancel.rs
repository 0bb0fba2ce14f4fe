// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cooperative cancellation for in-flight matching runs.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag checked by every surface task between candidate walls.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Stop conditions for one run: an optional token and an optional deadline
#[derive(Debug, Clone)]
pub(crate) struct RunGuard {
    token: Option<CancellationToken>,
    started: Instant,
    deadline: Option<Duration>,
}

impl RunGuard {
    pub(crate) fn new(token: Option<CancellationToken>, deadline: Option<Duration>) -> Self {
        Self {
            token,
            started: Instant::now(),
            deadline,
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled);
        }
        if let Some(limit) = self.deadline {
            let elapsed = self.started.elapsed();
            if elapsed >= limit {
                return Err(Error::DeadlineExceeded {
                    elapsed_ms: elapsed.as_millis(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

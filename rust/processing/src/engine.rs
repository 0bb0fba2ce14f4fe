// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel surface-to-wall matching.
//!
//! Every surface is an independent task on a bounded rayon pool. Inside a
//! task the walls are walked sequentially in input order:
//!
//! 1. bounding boxes grown by the buffer distance must overlap,
//! 2. every boundary point must lie in the buffered wall,
//! 3. every interior lattice point must lie in the buffered wall.
//!
//! The first wall passing all three is the match (first-fit). Results are
//! collected into one slot per surface, so no locking is involved and the
//! outcome does not depend on scheduling order.

use crate::cancel::{CancellationToken, RunGuard};
use crate::config::MatchConfig;
use crate::error::{Error, Result};
use crate::result::{Assignment, MatchResult, SurfaceMatch};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::sync::OnceLock;
use wallmatch_geometry::{
    contains, may_overlap, sample_interior, BufferedMesh, Point3, Surface, Wall, BOUNDARY_EPSILON,
};

type GeometryResult<T> = wallmatch_geometry::Result<T>;

/// Buffered wall meshes for one run, either memoized per wall or rebuilt on
/// every request.
enum WallBuffers {
    /// Built at most once per wall, on first use, shared read-only afterwards
    Cached {
        distance: f64,
        slots: Vec<OnceLock<GeometryResult<BufferedMesh>>>,
    },
    /// Built per candidate check and dropped right after
    OnDemand { distance: f64 },
}

impl WallBuffers {
    fn new(wall_count: usize, distance: f64, cache: bool) -> Self {
        if cache {
            WallBuffers::Cached {
                distance,
                slots: (0..wall_count).map(|_| OnceLock::new()).collect(),
            }
        } else {
            WallBuffers::OnDemand { distance }
        }
    }

    fn obtain(&self, index: usize, wall: &Wall) -> GeometryResult<Cow<'_, BufferedMesh>> {
        match self {
            WallBuffers::Cached { distance, slots } => {
                let slot = slots[index].get_or_init(|| {
                    let built = wall.buffered(*distance);
                    if let Err(err) = &built {
                        tracing::warn!(
                            wall = %wall.id(),
                            error = %err,
                            "Wall excluded from matching"
                        );
                    }
                    built
                });
                match slot {
                    Ok(mesh) => Ok(Cow::Borrowed(mesh)),
                    Err(err) => Err(err.clone()),
                }
            }
            WallBuffers::OnDemand { distance } => {
                let built = wall.buffered(*distance);
                if let Err(err) = &built {
                    tracing::warn!(wall = %wall.id(), error = %err, "Skipping candidate wall");
                }
                built.map(Cow::Owned)
            }
        }
    }

    fn cached_count(&self) -> usize {
        match self {
            WallBuffers::Cached { slots, .. } => slots.iter().filter(|s| s.get().is_some()).count(),
            WallBuffers::OnDemand { .. } => 0,
        }
    }
}

/// Outcome of one surface task
struct SurfaceOutcome {
    entry: SurfaceMatch,
    /// Walls that passed pruning and reached the containment test
    candidates: usize,
    /// Walls rejected by the bounding-box test before the walk stopped
    pruned: usize,
}

/// Matches analytical surfaces against architectural walls.
#[derive(Debug, Clone)]
pub struct SurfaceWallMatcher {
    config: MatchConfig,
    cancel: Option<CancellationToken>,
}

impl SurfaceWallMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Attach a token that aborts the run when cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Whether `surface` lies entirely inside `wall` buffered by the
    /// configured distance: boundary points first, then the interior lattice.
    ///
    /// Skips the bounding-box pruning step, so it answers for any pair.
    pub fn check_surface_wall_match(&self, surface: &Surface, wall: &Wall) -> Result<bool> {
        self.config.validate()?;
        let buffered = wall.buffered(self.config.effective_buffer_distance())?;
        let samples = sample_interior(surface, self.config.sample_resolution)?;
        Ok(is_fully_contained(&buffered, surface, &samples))
    }

    /// Assign every surface to the first wall that fully contains it.
    ///
    /// Fails without a result on invalid configuration, empty inputs,
    /// duplicate surface ids, cancellation or an expired deadline. Walls
    /// that cannot be buffered are skipped.
    pub fn match_surfaces(&self, surfaces: &[Surface], walls: &[Wall]) -> Result<MatchResult> {
        self.config.validate()?;

        if walls.is_empty() {
            return Err(Error::EmptyInput("walls"));
        }
        if surfaces.is_empty() {
            return Err(Error::EmptyInput("surfaces"));
        }

        let mut seen = FxHashSet::default();
        if let Some(dup) = surfaces.iter().find(|s| !seen.insert(s.id())) {
            return Err(Error::InvalidArgument(format!(
                "duplicate surface id '{}'",
                dup.id()
            )));
        }

        let distance = self.config.effective_buffer_distance();
        let guard = RunGuard::new(self.cancel.clone(), self.config.deadline());

        tracing::info!(
            surfaces = surfaces.len(),
            walls = walls.len(),
            buffer_distance = distance,
            sample_resolution = self.config.sample_resolution,
            worker_threads = self.config.worker_threads,
            cached_buffers = self.config.cache_buffered_meshes,
            "Starting surface-wall matching"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .build()?;

        let buffers = WallBuffers::new(walls.len(), distance, self.config.cache_buffered_meshes);

        let outcomes: Vec<SurfaceOutcome> = pool.install(|| {
            surfaces
                .par_iter()
                .map(|surface| self.match_surface(surface, walls, &buffers, &guard))
                .collect::<Result<Vec<_>>>()
        })?;

        let candidates: usize = outcomes.iter().map(|o| o.candidates).sum();
        let pruned: usize = outcomes.iter().map(|o| o.pruned).sum();
        let result = MatchResult::from_entries(outcomes.into_iter().map(|o| o.entry).collect());

        tracing::info!(
            matched = result.matched_count(),
            unmatched = result.unmatched_count(),
            candidate_checks = candidates,
            pruned_pairs = pruned,
            buffered_walls = buffers.cached_count(),
            elapsed_ms = guard.elapsed().as_millis(),
            "Surface-wall matching complete"
        );

        Ok(result)
    }

    fn match_surface(
        &self,
        surface: &Surface,
        walls: &[Wall],
        buffers: &WallBuffers,
        guard: &RunGuard,
    ) -> Result<SurfaceOutcome> {
        let distance = self.config.effective_buffer_distance();
        // Never narrower than the classifier's boundary band, so zero-buffer
        // boundary matches survive pruning
        let tolerance = distance.max(BOUNDARY_EPSILON);
        let samples = sample_interior(surface, self.config.sample_resolution)?;
        let mut candidates = 0;
        let mut pruned = 0;

        for (index, wall) in walls.iter().enumerate() {
            if !may_overlap(surface.bounds(), wall.bounds(), tolerance) {
                pruned += 1;
                continue;
            }
            guard.check()?;
            candidates += 1;

            let buffered = match buffers.obtain(index, wall) {
                Ok(buffered) => buffered,
                Err(err) if err.is_recoverable() => continue,
                Err(err) => return Err(err.into()),
            };

            if is_fully_contained(&buffered, surface, &samples) {
                tracing::debug!(
                    surface = %surface.id(),
                    wall = %wall.id(),
                    candidates,
                    pruned,
                    "Surface matched"
                );
                return Ok(SurfaceOutcome {
                    entry: SurfaceMatch {
                        surface_id: surface.id().to_string(),
                        assignment: Assignment::Matched(wall.id().to_string()),
                    },
                    candidates,
                    pruned,
                });
            }
        }

        tracing::debug!(surface = %surface.id(), candidates, pruned, "Surface unmatched");
        Ok(SurfaceOutcome {
            entry: SurfaceMatch {
                surface_id: surface.id().to_string(),
                assignment: Assignment::Unmatched,
            },
            candidates,
            pruned,
        })
    }
}

impl Default for SurfaceWallMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

/// Boundary points first; the interior lattice only once those all pass
fn is_fully_contained(buffered: &BufferedMesh, surface: &Surface, samples: &[Point3<f64>]) -> bool {
    contains(buffered, surface.points()) && contains(buffered, samples)
}

/// Match with default settings apart from the buffer distance (in model units)
pub fn match_surfaces(
    surfaces: &[Surface],
    walls: &[Wall],
    buffer_distance: f64,
) -> Result<MatchResult> {
    let config = MatchConfig::default().with_buffer_distance(buffer_distance);
    SurfaceWallMatcher::new(config).match_surfaces(surfaces, walls)
}

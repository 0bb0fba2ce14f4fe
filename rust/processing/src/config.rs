// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matching configuration, loadable from JSON or environment variables.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use wallmatch_geometry::DEFAULT_SAMPLE_RESOLUTION;

/// Length unit of a tolerance or of model coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[serde(alias = "millimeters")]
    Mm,
    #[serde(alias = "centimeters")]
    Cm,
    #[default]
    #[serde(alias = "meters")]
    M,
    #[serde(alias = "inches")]
    In,
    #[serde(alias = "feet")]
    Ft,
}

impl LengthUnit {
    /// Size of one unit in metres
    pub fn in_metres(self) -> f64 {
        match self {
            LengthUnit::Mm => 0.001,
            LengthUnit::Cm => 0.01,
            LengthUnit::M => 1.0,
            LengthUnit::In => 0.0254,
            LengthUnit::Ft => 0.3048,
        }
    }

    /// Factor converting a length in `self` to a length in `target`
    pub fn conversion_factor(self, target: LengthUnit) -> f64 {
        self.in_metres() / target.in_metres()
    }
}

impl FromStr for LengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeters" => Ok(LengthUnit::Mm),
            "cm" | "centimeters" => Ok(LengthUnit::Cm),
            "m" | "meters" => Ok(LengthUnit::M),
            "in" | "inches" => Ok(LengthUnit::In),
            "ft" | "feet" => Ok(LengthUnit::Ft),
            other => Err(Error::InvalidArgument(format!("unknown length unit '{}'", other))),
        }
    }
}

/// Configuration for a matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Outward offset applied to every wall before containment tests.
    pub buffer_distance: f64,
    /// Unit `buffer_distance` is expressed in.
    pub buffer_unit: LengthUnit,
    /// Unit of the surface and wall coordinates.
    pub model_unit: LengthUnit,
    /// Interior lattice points per axis.
    pub sample_resolution: usize,
    /// Number of worker threads for parallel processing.
    pub worker_threads: usize,
    /// Buffer each wall once before fan-out instead of per candidate check.
    pub cache_buffered_meshes: bool,
    /// Abort the run after this many seconds.
    pub deadline_secs: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            buffer_distance: 0.01,
            buffer_unit: LengthUnit::M,
            model_unit: LengthUnit::M,
            sample_resolution: DEFAULT_SAMPLE_RESOLUTION,
            worker_threads: num_cpus::get(),
            cache_buffered_meshes: true,
            deadline_secs: None,
        }
    }
}

impl MatchConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            buffer_distance: env_parse("WALLMATCH_BUFFER_DISTANCE")
                .unwrap_or(defaults.buffer_distance),
            buffer_unit: env_parse("WALLMATCH_BUFFER_UNIT").unwrap_or(defaults.buffer_unit),
            model_unit: env_parse("WALLMATCH_MODEL_UNIT").unwrap_or(defaults.model_unit),
            sample_resolution: env_parse("WALLMATCH_SAMPLE_RESOLUTION")
                .unwrap_or(defaults.sample_resolution),
            worker_threads: env_parse("WALLMATCH_WORKER_THREADS")
                .unwrap_or(defaults.worker_threads),
            cache_buffered_meshes: env_parse("WALLMATCH_CACHE_BUFFERED_MESHES")
                .unwrap_or(defaults.cache_buffered_meshes),
            deadline_secs: env_parse("WALLMATCH_DEADLINE_SECS").or(defaults.deadline_secs),
        }
    }

    /// Parse a JSON configuration object; absent fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_buffer_distance(mut self, distance: f64) -> Self {
        self.buffer_distance = distance;
        self
    }

    pub fn with_buffer_unit(mut self, unit: LengthUnit) -> Self {
        self.buffer_unit = unit;
        self
    }

    pub fn with_model_unit(mut self, unit: LengthUnit) -> Self {
        self.model_unit = unit;
        self
    }

    pub fn with_sample_resolution(mut self, resolution: usize) -> Self {
        self.sample_resolution = resolution;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn with_cached_buffers(mut self, cache: bool) -> Self {
        self.cache_buffered_meshes = cache;
        self
    }

    pub fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.deadline_secs = Some(secs);
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Buffer distance converted into the unit of the model geometry
    pub fn buffer_distance_in(&self, model_unit: LengthUnit) -> f64 {
        self.buffer_distance * self.buffer_unit.conversion_factor(model_unit)
    }

    /// Buffer distance in model units, the value geometry operations use
    pub fn effective_buffer_distance(&self) -> f64 {
        self.buffer_distance_in(self.model_unit)
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if !self.buffer_distance.is_finite() || self.buffer_distance < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "buffer distance must be finite and non-negative, got {}",
                self.buffer_distance
            )));
        }
        if self.sample_resolution < 2 {
            return Err(Error::InvalidArgument(format!(
                "sample resolution must be at least 2, got {}",
                self.sample_resolution
            )));
        }
        if self.worker_threads == 0 {
            return Err(Error::InvalidArgument(
                "worker thread count must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}

//! Simulation config.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoadError};

/// Parameters of a single simulation run.
///
/// It implements `Default`, so you can create a default config and change only the fields you need.
/// The same struct is read from YAML, missing fields take their default values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of functions kept in memory (`M`).
    pub capacity: usize,
    /// Rate of the exponentially distributed cold start delay, mean delay is `1 / cold_start_rate`.
    pub cold_start_rate: f64,
    /// Simulated time in seconds.
    pub horizon: f64,
    /// Interval between two metrics samples.
    pub metrics_interval: f64,
    /// Random seed of the run.
    pub seed: u64,
    /// Start with functions `0..capacity` loaded and idle instead of an empty memory.
    pub warm_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1,
            cold_start_rate: 0.5,
            horizon: 24. * 60. * 60.,
            metrics_interval: 1.,
            seed: 1,
            warm_start: false,
        }
    }
}

impl Config {
    /// Checks the config against the number of functions in the workload.
    pub fn validate(&self, function_count: usize) -> Result<(), ConfigError> {
        if function_count == 0 {
            return Err(ConfigError::EmptyFunctionTable);
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > function_count {
            return Err(ConfigError::CapacityExceedsFunctions {
                capacity: self.capacity,
                functions: function_count,
            });
        }
        // negated comparisons also reject NaN
        if !(self.horizon > 0.) {
            return Err(ConfigError::NonPositiveHorizon(self.horizon));
        }
        if !(self.cold_start_rate > 0.) {
            return Err(ConfigError::NonPositiveColdStartRate(self.cold_start_rate));
        }
        if !(self.metrics_interval > 0.) {
            return Err(ConfigError::NonPositiveMetricsInterval(self.metrics_interval));
        }
        Ok(())
    }

    /// Returns a copy of the config with another capacity and seed, used to build sweep jobs.
    pub fn with_run(&self, capacity: usize, seed: u64) -> Self {
        Self {
            capacity,
            seed,
            ..self.clone()
        }
    }

    pub fn from_yaml(path: &Path) -> Result<Self, LoadError> {
        let f = File::open(path)?;
        Ok(serde_yaml::from_reader(f)?)
    }
}

//! Environment configuration.
//!
//! Loaded from JSON with field-level defaults, so a config file only needs
//! the keys it changes:
//!
//! ```json
//! { "time_limit": 5700.0, "terminate_on_time_limit": true }
//! ```
//!
//! `time_limit` may be omitted or `null` for an unlimited episode.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use st_core::{SatError, SatResult, SimConfig};

/// Timing and termination policy for one environment.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Engine tick length in simulated seconds.
    pub sim_rate: f64,

    /// Upper bound on simulated time per `step`.
    pub max_step_duration: f64,

    /// Episode time budget; `f64::INFINITY` disables truncation.
    #[serde(deserialize_with = "unlimited_if_null")]
    pub time_limit: f64,

    /// Also report `terminated` when the time limit is reached.
    pub terminate_on_time_limit: bool,

    /// Added to the reward once per dead satellite, every step it is dead.
    pub failure_penalty: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            sim_rate:                1.0,
            max_step_duration:       600.0,
            time_limit:              f64::INFINITY,
            terminate_on_time_limit: false,
            failure_penalty:         -100.0,
        }
    }
}

impl EnvConfig {
    pub fn from_json_str(json: &str) -> SatResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> SatResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject timing values the engine cannot run with.
    pub fn validate(&self) -> SatResult<()> {
        if !(self.sim_rate > 0.0 && self.sim_rate.is_finite()) {
            return Err(SatError::Config(format!(
                "sim_rate must be positive and finite, got {}",
                self.sim_rate
            )));
        }
        if !(self.max_step_duration > 0.0) {
            return Err(SatError::Config(format!(
                "max_step_duration must be positive, got {}",
                self.max_step_duration
            )));
        }
        // NaN fails this comparison too.
        if !(self.time_limit > 0.0) {
            return Err(SatError::Config(format!(
                "time_limit must be positive, got {}",
                self.time_limit
            )));
        }
        Ok(())
    }

    /// The engine-facing subset.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            sim_rate:          self.sim_rate,
            max_step_duration: self.max_step_duration,
            time_limit:        self.time_limit,
        }
    }
}

fn unlimited_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

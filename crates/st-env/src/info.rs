//! Step results and the per-step info mapping.

use serde::ser::{Serialize, SerializeMap, Serializer};
use st_core::{Observation, SatelliteId};
use st_satellite::InfoMap;

/// Top-level keys of the serialized [`EnvInfo`] that no satellite id may take.
pub const RESERVED_INFO_KEYS: [&str; 2] = ["d_ts", "requires_retasking"];

/// Diagnostic information returned by `reset` and `step`.
///
/// Serializes as one flat mapping: every satellite's info under its id, plus
/// the reserved keys `d_ts` and `requires_retasking`.
///
/// ```json
/// { "EO-1": { "altitude": 499812.3 }, "d_ts": 60.0, "requires_retasking": ["EO-1"] }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvInfo {
    /// Per-satellite info, in satellite order.
    pub satellites: Vec<(SatelliteId, InfoMap)>,

    /// Simulated seconds covered by the latest step.
    pub d_ts: f64,

    /// Satellites whose retasking flag is set, in satellite order.
    pub requires_retasking: Vec<SatelliteId>,
}

impl EnvInfo {
    pub fn satellite(&self, id: &str) -> Option<&InfoMap> {
        self.satellites
            .iter()
            .find(|(sat, _)| sat.as_str() == id)
            .map(|(_, info)| info)
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serializing a map of strings and JSON values cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Serialize for EnvInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.satellites.len() + 2))?;
        for (id, info) in &self.satellites {
            map.serialize_entry(id.as_str(), info)?;
        }
        map.serialize_entry("d_ts", &self.d_ts)?;
        let retasking: Vec<&str> = self.requires_retasking.iter().map(SatelliteId::as_str).collect();
        map.serialize_entry("requires_retasking", &retasking)?;
        map.end()
    }
}

/// Everything one `step` returns.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult<O = Observation> {
    pub observation: O,
    pub reward:      f64,
    pub terminated:  bool,
    pub truncated:   bool,
    pub info:        EnvInfo,
}

impl<O> StepResult<O> {
    /// `true` once the episode should be reset.
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }

    /// Replace the observation, keeping everything else.
    pub fn map_observation<P>(self, f: impl FnOnce(O) -> P) -> StepResult<P> {
        StepResult {
            observation: f(self.observation),
            reward:      self.reward,
            terminated:  self.terminated,
            truncated:   self.truncated,
            info:        self.info,
        }
    }
}

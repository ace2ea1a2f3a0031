//! `st-core` — foundational types for the `sat_tasking` framework.
//!
//! This crate is a dependency of every other `st-*` crate.  It has no `st-*`
//! dependencies and few external ones (`rand`, `thiserror`, `serde_json`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `SatelliteId`, `SatIndex`, `TargetId`                     |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                           |
//! | [`rng`]         | `SatRng` (per-satellite), `SimRng` (episode-level)        |
//! | [`args`]        | `ArgValue`, `Generator`, `GeneratorMap`, `ArgMap`         |
//! | [`space`]       | `Space`, `Action`, `Observation`                          |
//! | [`error`]       | `SatError`, `SatResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the public value types.  |

pub mod args;
pub mod error;
pub mod ids;
pub mod rng;
pub mod space;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use args::{ArgMap, ArgValue, Generator, GeneratorMap, Sampler};
pub use error::{SatError, SatResult};
pub use ids::{SatIndex, SatelliteId, TargetId};
pub use rng::{SatRng, SimRng};
pub use space::{Action, Observation, Space};
pub use time::{SimClock, SimConfig, Tick};

//! `st-env` — the episode controller for the `sat_tasking` framework.
//!
//! [`GeneralSatelliteTasking`] drives a list of independently tasked
//! satellites against one shared simulator.  Each step it dispatches one
//! optional action per satellite, lets the simulator advance time, folds the
//! new data into every satellite's data store, and returns the composed
//! observation, the reward, and the termination/truncation flags.
//!
//! # Episode lifecycle
//!
//! ```text
//! reset(seed):
//!   ① resolve env_args from the seed; copy shared keys into each satellite
//!   ② reset environment features; build a fresh simulator
//!   ③ satellite.reset_pre_sim        (resolves sat_args)
//!   ④ data_manager.create_data_store (one per satellite)
//!   ⑤ communicator.reset
//!   ⑥ satellite.reset_post_sim
//!
//! step(actions):
//!   ① set_action for every Some(action)
//!   ② simulator.run                  (engine decides how far to go)
//!   ③ data_store.internal_update; communicator.communicate
//!   ④ reward = data_manager.reward + failure_penalty × dead satellites
//!   ⑤ terminated / truncated
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use st_env::{EnvConfig, TaskingBuilder};
//! use st_satellite::DriftSatellite;
//! use st_sim::FixedStepFactory;
//!
//! let sat = DriftSatellite::new("EO-1", DriftSatellite::default_sat_args());
//! let mut env = TaskingBuilder::new(FixedStepFactory)
//!     .satellite(sat)
//!     .config(EnvConfig { time_limit: 5_700.0, ..EnvConfig::default() })
//!     .build_single()?;
//! let (obs, _info) = env.reset(Some(0))?;
//! let result = env.step(Some(Action::Discrete(0)))?;
//! ```

pub mod builder;
pub mod config;
pub mod env;
pub mod info;
pub mod observer;
pub mod single;

#[cfg(test)]
mod tests;

pub use builder::TaskingBuilder;
pub use config::EnvConfig;
pub use env::GeneralSatelliteTasking;
pub use info::{EnvInfo, RESERVED_INFO_KEYS, StepResult};
pub use observer::{NoopObserver, StepRecord, TaskingObserver};
pub use single::SingleSatelliteTasking;

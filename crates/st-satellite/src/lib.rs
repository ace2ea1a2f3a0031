//! `st-satellite` — the agent side of the `sat_tasking` framework.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`satellite`]   | `Satellite` trait, `SatelliteState`, `InfoMap`                  |
//! | [`data`]        | `DataStore`, `DataManager`, `NoDataManager`                     |
//! | [`features`]    | `EnvironmentFeatures`, `Target`, `StaticTargets`                |
//! | [`comm`]        | `Communicator`, `NoCommunication`                               |
//! | [`orbit`]       | two-body helpers, `random_orbit`, `random_epoch`                |
//! | [`drift`]       | `DriftSatellite` — an inert satellite that only coasts          |
//!
//! # Design notes
//!
//! The episode controller (st-env) only ever sees `Box<dyn Satellite>`.
//! Concrete control laws and sensor models live behind that trait; shared
//! bookkeeping (id, configuration, retasking flag, data store, info) lives in
//! [`SatelliteState`] so implementors get the common hooks for free.

pub mod comm;
pub mod data;
pub mod drift;
pub mod features;
pub mod orbit;
pub mod satellite;


pub use comm::{Communicator, NoCommunication};
pub use data::{DataManager, DataStore, NoDataManager, NoDataStore};
pub use drift::DriftSatellite;
pub use features::{EnvironmentFeatures, StaticTargets, Target};
pub use satellite::{InfoMap, Satellite, SatelliteState};

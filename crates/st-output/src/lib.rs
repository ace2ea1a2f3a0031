//! `st-output` — episode output writers for the `sat_tasking` framework.
//!
//! | Backend | Files created                                        |
//! |---------|------------------------------------------------------|
//! | CSV     | `step_summaries.csv`, `satellite_snapshots.csv`      |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`StepOutputObserver`], which implements `st_env::TaskingObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use st_output::{CsvWriter, StepOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut env = TaskingBuilder::new(FixedStepFactory)
//!     .satellite(sat)
//!     .observer(StepOutputObserver::new(writer))
//!     .build()?;
//! // ... run episodes ...
//! let mut obs = env.into_observer();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::StepOutputObserver;
pub use row::{SatelliteSnapshotRow, StepSummaryRow};
pub use writer::OutputWriter;

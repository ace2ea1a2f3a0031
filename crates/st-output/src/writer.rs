//! The `OutputWriter` trait implemented by backend writers.

use crate::{OutputResult, SatelliteSnapshotRow, StepSummaryRow};

/// Sink for episode rows.
///
/// Errors are returned here but stored by the observer, since observer
/// callbacks have no return value; retrieve them with
/// [`StepOutputObserver::take_error`][crate::StepOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one row per satellite for the same step.
    fn write_snapshots(&mut self, rows: &[SatelliteSnapshotRow]) -> OutputResult<()>;

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

//! `StepOutputObserver<W>` — bridges `TaskingObserver` to an `OutputWriter`.

use st_env::{StepRecord, TaskingObserver};
use st_satellite::Satellite;

use crate::row::{SatelliteSnapshotRow, StepSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`TaskingObserver`] that writes satellite snapshots and step summaries
/// to any [`OutputWriter`] backend.
///
/// Snapshots are written after every reset (as step 0) and every step.
/// Errors from the writer are stored internally because observer methods
/// have no return value.  Check for them with
/// [`take_error`][Self::take_error].
pub struct StepOutputObserver<W: OutputWriter> {
    writer:     W,
    episode:    u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> StepOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, episode: 0, last_error: None }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Number of resets observed so far.
    pub fn episodes(&self) -> u64 {
        self.episode
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn snapshot_rows(
        &self,
        step:       u64,
        satellites: &[Box<dyn Satellite>],
    ) -> OutputResult<Vec<SatelliteSnapshotRow>> {
        satellites
            .iter()
            .enumerate()
            .map(|(i, sat)| {
                Ok(SatelliteSnapshotRow {
                    episode:            self.episode,
                    step,
                    sat_index:          i as u32,
                    satellite:          sat.id().to_string(),
                    alive:              sat.is_alive(),
                    requires_retasking: sat.requires_retasking(),
                    observation:        serde_json::to_string(&sat.get_obs())?,
                    info:               serde_json::to_string(&sat.info())?,
                })
            })
            .collect()
    }

    fn write_snapshots(&mut self, step: u64, satellites: &[Box<dyn Satellite>]) {
        let result = self.snapshot_rows(step, satellites).and_then(|rows| {
            if rows.is_empty() {
                Ok(())
            } else {
                self.writer.write_snapshots(&rows)
            }
        });
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> TaskingObserver for StepOutputObserver<W> {
    fn on_reset(&mut self, _seed: u64, satellites: &[Box<dyn Satellite>]) {
        self.episode += 1;
        self.write_snapshots(0, satellites);
    }

    fn on_step(&mut self, record: &StepRecord<'_>, satellites: &[Box<dyn Satellite>]) {
        let row = StepSummaryRow {
            episode:    self.episode,
            step:       record.step,
            sim_time:   record.sim_time,
            d_ts:       record.info.d_ts,
            reward:     record.reward,
            terminated: record.terminated,
            truncated:  record.truncated,
            retasking:  record.info.requires_retasking.len() as u32,
        };
        let result = self.writer.write_step_summary(&row);
        self.store_err(result);
        self.write_snapshots(record.step, satellites);
    }

    fn on_close(&mut self, _steps: u64) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}

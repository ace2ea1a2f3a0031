//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `satellite_snapshots.csv`
//! - `step_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, SatelliteSnapshotRow, StepSummaryRow};

/// Writes episode output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("satellite_snapshots.csv"))?;
        snapshots.write_record([
            "episode",
            "step",
            "sat_index",
            "satellite",
            "alive",
            "requires_retasking",
            "observation",
            "info",
        ])?;

        let mut summaries = Writer::from_path(dir.join("step_summaries.csv"))?;
        summaries.write_record([
            "episode",
            "step",
            "sim_time",
            "d_ts",
            "reward",
            "terminated",
            "truncated",
            "retasking",
        ])?;

        Ok(Self { snapshots, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[SatelliteSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.episode.to_string(),
                row.step.to_string(),
                row.sat_index.to_string(),
                row.satellite.clone(),
                (row.alive as u8).to_string(),
                (row.requires_retasking as u8).to_string(),
                row.observation.clone(),
                row.info.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.episode.to_string(),
            row.step.to_string(),
            row.sim_time.to_string(),
            row.d_ts.to_string(),
            row.reward.to_string(),
            (row.terminated as u8).to_string(),
            (row.truncated as u8).to_string(),
            row.retasking.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}

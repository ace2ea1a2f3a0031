//! Plain data row types written by output backends.

/// One satellite's state after a reset (`step == 0`) or a step.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteSnapshotRow {
    /// 1-based count of resets seen by the observer.
    pub episode:            u64,
    pub step:               u64,
    pub sat_index:          u32,
    pub satellite:          String,
    pub alive:              bool,
    pub requires_retasking: bool,
    /// JSON-encoded observation.
    pub observation:        String,
    /// JSON-encoded info mapping.
    pub info:               String,
}

/// Summary of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSummaryRow {
    pub episode:    u64,
    pub step:       u64,
    pub sim_time:   f64,
    pub d_ts:       f64,
    pub reward:     f64,
    pub terminated: bool,
    pub truncated:  bool,
    /// Satellites awaiting a task after the step.
    pub retasking:  u32,
}

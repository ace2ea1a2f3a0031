//! Episode observer trait for progress reporting and data collection.

use st_satellite::Satellite;

use crate::EnvInfo;

/// Summary of one completed step, handed to [`TaskingObserver::on_step`].
#[derive(Debug, Clone, Copy)]
pub struct StepRecord<'a> {
    /// 1-based index of the step within the episode.
    pub step:       u64,
    pub sim_time:   f64,
    pub reward:     f64,
    pub terminated: bool,
    pub truncated:  bool,
    pub info:       &'a EnvInfo,
}

/// Callbacks invoked by the environment at episode boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — reward logger
///
/// ```rust,ignore
/// struct RewardLog(Vec<f64>);
///
/// impl TaskingObserver for RewardLog {
///     fn on_step(&mut self, record: &StepRecord<'_>, _sats: &[Box<dyn Satellite>]) {
///         self.0.push(record.reward);
///     }
/// }
/// ```
pub trait TaskingObserver {
    /// Called at the end of every successful `reset`.
    fn on_reset(&mut self, _seed: u64, _satellites: &[Box<dyn Satellite>]) {}

    /// Called at the end of every successful `step`.
    fn on_step(&mut self, _record: &StepRecord<'_>, _satellites: &[Box<dyn Satellite>]) {}

    /// Called when the environment releases its simulator.
    fn on_close(&mut self, _steps: u64) {}
}

/// A [`TaskingObserver`] that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TaskingObserver for NoopObserver {}

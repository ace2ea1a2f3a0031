//! A fixed-step engine: every satellite integrates its own state one tick at
//! a time.

use st_core::{ArgMap, SatResult, SimClock, SimConfig, Tick};
use st_satellite::Satellite;
use tracing::{debug, trace};

use crate::{Simulator, SimulatorFactory};

/// Builds [`FixedStepSimulator`]s.  Reads the episode epoch from the
/// `utc_init` argument (Unix seconds); absent means epoch 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStepFactory;

impl SimulatorFactory for FixedStepFactory {
    type Sim = FixedStepSimulator;

    fn build(&self, config: &SimConfig, env_args: &ArgMap) -> SatResult<FixedStepSimulator> {
        let start = env_args.int("utc_init").unwrap_or(0);
        Ok(FixedStepSimulator::new(config.clone(), start))
    }
}

/// Tick-based engine with `sim_rate`-second ticks.
///
/// A run never advances past `max_step_duration` (at least one tick is always
/// taken) nor past `time_limit`.  A time limit that is not a whole number of
/// ticks is reached with one final partial tick.
pub struct FixedStepSimulator {
    /// Timing configuration for this episode.
    pub config: SimConfig,

    /// Simulation clock — tracks the current tick and maps to wall time.
    pub clock: SimClock,

    /// Last whole tick at or before `time_limit` (`u64::MAX` when unlimited).
    limit_tick: Tick,

    /// Seconds between `limit_tick` and `time_limit`; zero when the limit
    /// falls on the tick grid.
    limit_remainder: f64,

    /// Set once the partial tick up to `time_limit` has been integrated.
    at_limit: bool,

    /// Ticks one `run` call may advance.
    max_step_ticks: u64,
}

impl FixedStepSimulator {
    pub fn new(config: SimConfig, start_unix_secs: i64) -> Self {
        let clock = config.make_clock(start_unix_secs);
        let limit_tick = Tick(clock.ticks_for_secs(config.time_limit));
        let limit_remainder = if config.time_limit.is_finite() {
            (config.time_limit - limit_tick.0 as f64 * config.sim_rate).max(0.0)
        } else {
            0.0
        };
        let limit_remainder = if limit_remainder < 1e-9 { 0.0 } else { limit_remainder };
        let max_step_ticks = clock.ticks_for_secs(config.max_step_duration).max(1);
        Self {
            config,
            clock,
            limit_tick,
            limit_remainder,
            at_limit: false,
            max_step_ticks,
        }
    }

    /// Current Unix time of the episode.
    pub fn utc_now(&self) -> f64 {
        self.clock.start_unix_secs as f64 + self.sim_time()
    }

    /// Whether any satellite stops the run after the latest tick.
    fn should_stop(satellites: &[Box<dyn Satellite>], waiting: &[bool]) -> bool {
        let newly_waiting = satellites
            .iter()
            .zip(waiting)
            .any(|(s, &was)| !was && s.requires_retasking());
        let any_dead = satellites.iter().any(|s| !s.is_alive());
        if newly_waiting || any_dead {
            trace!(newly_waiting, any_dead, "run stopped early");
        }
        newly_waiting || any_dead
    }
}

impl Simulator for FixedStepSimulator {
    fn sim_time(&self) -> f64 {
        if self.at_limit {
            self.config.time_limit
        } else {
            self.clock.sim_time()
        }
    }

    fn run(&mut self, satellites: &mut [Box<dyn Satellite>]) -> SatResult<()> {
        let start = self.clock.current_tick;
        let end = start.offset(self.max_step_ticks).min(self.limit_tick);

        // Satellites already waiting for a task must not cut every step to a
        // single tick; only a fresh request ends the run early.
        let waiting: Vec<bool> = satellites.iter().map(|s| s.requires_retasking()).collect();

        let mut stopped = false;
        while self.clock.current_tick < end {
            let t = self.clock.sim_time();
            for sat in satellites.iter_mut() {
                sat.integrate(t, self.config.sim_rate)?;
            }
            self.clock.advance();

            if Self::should_stop(satellites, &waiting) {
                stopped = true;
                break;
            }
        }

        // The partial tick counts against the step budget like a whole one.
        let used = self.clock.current_tick - start;
        if !stopped
            && !self.at_limit
            && self.limit_remainder > 0.0
            && self.clock.current_tick == self.limit_tick
            && used < self.max_step_ticks
        {
            let t = self.clock.sim_time();
            for sat in satellites.iter_mut() {
                sat.integrate(t, self.limit_remainder)?;
            }
            self.at_limit = true;
        }

        debug!(
            from = %start,
            to   = %self.clock.current_tick,
            sim_time = self.sim_time(),
            "simulator advanced"
        );
        Ok(())
    }
}

//! Simulation time model.
//!
//! # Design
//!
//! Engines advance time as a monotonically increasing `Tick` counter, where
//! one tick is `sim_rate` simulated seconds:
//!
//!   sim_time = tick * sim_rate
//!
//! Deriving the float time from an integer tick (rather than accumulating
//! `sim_time += sim_rate`) keeps time on an exact grid, so a run with
//! `sim_rate = 1.0` and `time_limit = 100.0` stops at exactly `100.0`.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`, saturating at `u64::MAX`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0.saturating_add(n))
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts, simulated seconds, and Unix time.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0 — the episode's
    /// `utc_init`.
    pub start_unix_secs: i64,
    /// Simulated seconds per tick.
    pub sim_rate: f64,
    /// The current tick — advanced by `SimClock::advance()`.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start_unix_secs: i64, sim_rate: f64) -> Self {
        Self {
            start_unix_secs,
            sim_rate,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn sim_time(&self) -> f64 {
        self.current_tick.0 as f64 * self.sim_rate
    }

    /// Current Unix time (fractional seconds).
    #[inline]
    pub fn current_unix_secs(&self) -> f64 {
        self.start_unix_secs as f64 + self.sim_time()
    }

    /// How many whole ticks fit in `secs` seconds?  Rounds down so an engine
    /// never overshoots a bound; values within float noise of a whole tick
    /// count are snapped to it.  Infinite spans map to `u64::MAX`.
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        if !secs.is_finite() {
            return u64::MAX;
        }
        let ticks = secs.max(0.0) / self.sim_rate;
        let nearest = ticks.round();
        if (ticks - nearest).abs() < 1e-9 {
            nearest as u64
        } else {
            ticks.floor() as u64
        }
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} s)", self.current_tick, self.sim_time())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Engine-facing timing configuration, handed to simulator factories and to
/// satellite reset hooks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated seconds per engine tick.
    pub sim_rate: f64,

    /// Upper bound on how far one `run` call may advance simulated time.
    pub max_step_duration: f64,

    /// Episode time budget in simulated seconds.  `f64::INFINITY` disables
    /// truncation.
    pub time_limit: f64,
}

impl SimConfig {
    /// `true` once `sim_time` has reached the episode's time budget.
    #[inline]
    pub fn time_limit_reached(&self, sim_time: f64) -> bool {
        sim_time >= self.time_limit
    }

    /// Construct a `SimClock` at tick 0 for this configuration.
    pub fn make_clock(&self, start_unix_secs: i64) -> SimClock {
        SimClock::new(start_unix_secs, self.sim_rate)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sim_rate:          1.0,
            max_step_duration: 600.0,
            time_limit:        f64::INFINITY,
        }
    }
}

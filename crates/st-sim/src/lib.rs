//! `st-sim` — the simulation engine boundary for the `sat_tasking` framework.
//!
//! The episode controller never advances time itself.  It builds one
//! [`Simulator`] per episode through a [`SimulatorFactory`] (the environment
//! "type") and calls [`Simulator::run`] once per step; the engine decides how
//! far to advance.
//!
//! # Fixed-step engine
//!
//! ```text
//! run():
//!   end = min(now + ticks(max_step_duration), ticks(time_limit))
//!   while now < end:
//!     ① integrate every satellite over one tick (sim_rate seconds)
//!     ② advance the clock
//!     ③ stop early if a satellite newly requires retasking or has died
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use st_sim::{FixedStepFactory, Simulator, SimulatorFactory};
//!
//! let mut sim = FixedStepFactory.build(&config, &env_args)?;
//! sim.run(&mut satellites)?;
//! println!("t = {}", sim.sim_time());
//! ```

pub mod engine;
pub mod simulator;


pub use engine::{FixedStepFactory, FixedStepSimulator};
pub use simulator::{Simulator, SimulatorFactory};

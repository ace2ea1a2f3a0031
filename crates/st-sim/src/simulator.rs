//! The `Simulator` and `SimulatorFactory` traits.

use st_core::{ArgMap, GeneratorMap, SatResult, SimConfig};
use st_satellite::{Satellite, orbit};

/// One episode's simulation engine.
///
/// Engines are not resettable: the environment drops the old instance and
/// builds a new one through its [`SimulatorFactory`] on every reset.
pub trait Simulator {
    /// Simulated seconds since the start of the episode.
    fn sim_time(&self) -> f64;

    /// Advance simulated time by an engine-chosen amount, bounded by the
    /// configured `max_step_duration` and `time_limit` and by satellites'
    /// retasking needs.
    ///
    /// `satellites` is in environment order.  Called only by the environment,
    /// once per step.
    fn run(&mut self, satellites: &mut [Box<dyn Satellite>]) -> SatResult<()>;
}

/// Builds a fresh [`Simulator`] for each episode.
pub trait SimulatorFactory {
    type Sim: Simulator;

    /// Episode arguments this engine expects.  The environment fills in any
    /// key the user's generator leaves out.  Default: a random `utc_init`.
    fn default_env_args(&self) -> GeneratorMap {
        GeneratorMap::new().with_sampled("utc_init", orbit::random_epoch)
    }

    /// `env_args` is the episode's resolved argument mapping.
    fn build(&self, config: &SimConfig, env_args: &ArgMap) -> SatResult<Self::Sim>;
}

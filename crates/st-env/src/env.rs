//! `GeneralSatelliteTasking` and its reset/step/close protocol.

use st_core::{
    Action, ArgMap, GeneratorMap, Observation, SatError, SatIndex, SatResult, SatRng, SimRng,
    Space,
};
use st_satellite::{Communicator, DataManager, DataStore, EnvironmentFeatures, Satellite};
use st_sim::{Simulator, SimulatorFactory};
use tracing::{debug, info, warn};

use crate::{EnvConfig, EnvInfo, NoopObserver, StepRecord, StepResult, TaskingObserver};

/// Offset of the child RNG handed to the environment features.
const FEATURES_RNG_OFFSET: u64 = 1;

/// Multi-satellite episode controller.
///
/// Holds the ordered satellites and one simulator per episode.  Spaces,
/// observations, and actions are tuples in satellite order.
///
/// Create via [`TaskingBuilder`][crate::TaskingBuilder].
pub struct GeneralSatelliteTasking<F: SimulatorFactory, O: TaskingObserver = NoopObserver> {
    pub(crate) satellites:         Vec<Box<dyn Satellite>>,
    pub(crate) factory:            F,
    pub(crate) env_features:       Box<dyn EnvironmentFeatures>,
    pub(crate) data_manager:       Box<dyn DataManager>,
    pub(crate) communicator:       Box<dyn Communicator>,
    pub(crate) observer:           O,
    pub(crate) config:             EnvConfig,

    /// Episode-level configuration, resolved at every reset.
    pub(crate) env_args_generator: GeneratorMap,

    /// Keys of `env_args` copied into every satellite's generator.
    pub(crate) shared_args:        Vec<String>,

    pub(crate) env_args:           ArgMap,

    /// `None` before the first reset and after `close`.
    pub(crate) simulator:          Option<F::Sim>,

    pub(crate) seed:               Option<u64>,
    pub(crate) latest_step_duration: f64,
    pub(crate) step_count:         u64,
}

impl<F: SimulatorFactory, O: TaskingObserver> GeneralSatelliteTasking<F, O> {
    // ── Spaces ────────────────────────────────────────────────────────────

    /// Tuple of every satellite's action space.
    pub fn action_space(&self) -> Space {
        Space::Tuple(self.satellites.iter().map(|s| s.action_space()).collect())
    }

    /// Tuple of every satellite's observation space.
    ///
    /// Observation spaces may depend on episode state, so if no simulator
    /// exists yet this first resets the environment with the stored seed
    /// (exactly once).  With a live simulator it never resets.
    pub fn observation_space(&mut self) -> SatResult<Space> {
        if self.simulator.is_none() {
            debug!("observation space requested before reset; resetting");
            self.reset(self.seed)?;
        }
        Ok(Space::Tuple(self.satellites.iter().map(|s| s.observation_space()).collect()))
    }

    // ── Episode control ───────────────────────────────────────────────────

    /// Start a new episode.
    ///
    /// `None` draws a fresh seed; the seed actually used is stored and
    /// available through [`seed`](Self::seed).  Two resets with the same seed
    /// resolve identical episode and satellite arguments.
    ///
    /// A reset that fails partway leaves no simulator behind, so `step`
    /// returns [`SatError::NotReset`] until a reset succeeds.
    pub fn reset(&mut self, seed: Option<u64>) -> SatResult<(Observation, EnvInfo)> {
        self.simulator = None;
        let seed = seed.unwrap_or_else(rand::random);
        self.seed = Some(seed);
        let mut rng = SimRng::new(seed);

        // ── Episode arguments ─────────────────────────────────────────────
        self.env_args = self.env_args_generator.resolve(rng.inner());
        for key in &self.shared_args {
            let value = self
                .env_args
                .get(key)
                .ok_or_else(|| SatError::MissingArg(key.clone()))?;
            for sat in &mut self.satellites {
                sat.sat_args_generator_mut().set(key.clone(), value.clone().into());
            }
        }

        // ── World and engine ──────────────────────────────────────────────
        let mut features_rng = rng.child(FEATURES_RNG_OFFSET);
        self.env_features.reset(features_rng.inner())?;

        let sim_config = self.config.sim_config();
        let simulator = self.factory.build(&sim_config, &self.env_args)?;

        // ── Satellites ────────────────────────────────────────────────────
        for (i, sat) in self.satellites.iter_mut().enumerate() {
            let index = SatIndex::try_from(i)
                .map_err(|_| SatError::Config(format!("satellite index {i} out of range")))?;
            sat.reset_pre_sim(&sim_config, &mut SatRng::new(seed, index))?;
        }

        self.data_manager.reset()?;
        for sat in &mut self.satellites {
            let store = self
                .data_manager
                .create_data_store(&**sat, &*self.env_features)?;
            sat.attach_data_store(store);
        }

        self.communicator.reset()?;

        for sat in &mut self.satellites {
            sat.reset_post_sim()?;
        }
        self.simulator = Some(simulator);

        self.latest_step_duration = 0.0;
        self.step_count = 0;
        debug!(seed, satellites = self.satellites.len(), "environment reset");

        self.observer.on_reset(seed, &self.satellites);
        Ok((self.observation(), self.info()))
    }

    /// Advance the episode.
    ///
    /// `actions` holds one entry per satellite, in order.  `None` means "no
    /// new task".  Every action is checked against its satellite's action
    /// space before any satellite is touched.
    pub fn step(&mut self, actions: &[Option<Action>]) -> SatResult<StepResult> {
        if actions.len() != self.satellites.len() {
            return Err(SatError::ActionCountMismatch {
                expected: self.satellites.len(),
                got:      actions.len(),
            });
        }
        let Some(simulator) = self.simulator.as_mut() else {
            return Err(SatError::NotReset);
        };

        for (sat, action) in self.satellites.iter().zip(actions) {
            if let Some(action) = action {
                if !sat.action_space().contains(action) {
                    return Err(SatError::InvalidAction {
                        satellite: sat.id().clone(),
                        reason:    format!("{action:?} is outside {:?}", sat.action_space()),
                    });
                }
            }
        }

        // ── Dispatch ──────────────────────────────────────────────────────
        for (sat, action) in self.satellites.iter_mut().zip(actions) {
            match action {
                Some(action) => sat.set_action(action)?,
                None if sat.requires_retasking() => {
                    warn!(satellite = %sat.id(), "satellite requires retasking but received no task");
                }
                None => {}
            }
        }

        // ── Simulate ──────────────────────────────────────────────────────
        let t0 = simulator.sim_time();
        simulator.run(&mut self.satellites)?;
        let sim_time = simulator.sim_time();
        self.latest_step_duration = sim_time - t0;

        for sat in &mut self.satellites {
            if let Some(store) = sat.data_store_mut() {
                store.internal_update()?;
            }
        }
        self.communicator.communicate(&mut self.satellites)?;

        // ── Reward and flags ──────────────────────────────────────────────
        let stores: Vec<&dyn DataStore> = self
            .satellites
            .iter()
            .map(|s| s.data_store())
            .collect::<Option<_>>()
            .ok_or(SatError::NotReset)?;
        let mut reward = self.data_manager.reward(&stores)?;

        let mut all_alive = true;
        for sat in self.satellites.iter().filter(|s| !s.is_alive()) {
            info!(satellite = %sat.id(), sim_time, "satellite failed");
            reward += self.config.failure_penalty;
            all_alive = false;
        }

        let time_limit_reached = self.config.sim_config().time_limit_reached(sim_time);
        let terminated =
            !all_alive || (time_limit_reached && self.config.terminate_on_time_limit);
        let truncated = time_limit_reached;
        if terminated || truncated {
            info!(sim_time, terminated, truncated, "episode ended");
        }

        self.step_count += 1;
        let info = self.info();
        debug!(
            step = self.step_count,
            sim_time,
            d_ts = self.latest_step_duration,
            reward,
            "step complete"
        );

        self.observer.on_step(
            &StepRecord {
                step: self.step_count,
                sim_time,
                reward,
                terminated,
                truncated,
                info: &info,
            },
            &self.satellites,
        );

        Ok(StepResult {
            observation: self.observation(),
            reward,
            terminated,
            truncated,
            info,
        })
    }

    /// Release the simulator.  `step` fails with [`SatError::NotReset`]
    /// until the next `reset`.  Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.simulator.take().is_some() {
            debug!(steps = self.step_count, "environment closed");
            self.observer.on_close(self.step_count);
        }
    }

    // ── Composition ───────────────────────────────────────────────────────

    fn observation(&self) -> Observation {
        Observation::Tuple(self.satellites.iter().map(|s| s.get_obs()).collect())
    }

    fn info(&self) -> EnvInfo {
        EnvInfo {
            satellites:         self
                .satellites
                .iter()
                .map(|s| (s.id().clone(), s.info()))
                .collect(),
            d_ts:               self.latest_step_duration,
            requires_retasking: self
                .satellites
                .iter()
                .filter(|s| s.requires_retasking())
                .map(|s| s.id().clone())
                .collect(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn satellites(&self) -> &[Box<dyn Satellite>] {
        &self.satellites
    }

    /// `None` before the first reset and after `close`.
    pub fn simulator(&self) -> Option<&F::Sim> {
        self.simulator.as_ref()
    }

    /// This episode's resolved arguments.
    pub fn env_args(&self) -> &ArgMap {
        &self.env_args
    }

    pub fn env_features(&self) -> &dyn EnvironmentFeatures {
        &*self.env_features
    }

    /// Seed of the current (or last) episode.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn latest_step_duration(&self) -> f64 {
        self.latest_step_duration
    }

    /// Steps taken since the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Close the environment and hand back its observer.
    pub fn into_observer(mut self) -> O {
        self.close();
        self.observer
    }
}

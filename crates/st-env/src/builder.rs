//! Fluent builder for constructing a [`GeneralSatelliteTasking`].

use std::collections::HashSet;

use st_core::{GeneratorMap, SatError, SatResult};
use st_satellite::{
    Communicator, DataManager, EnvironmentFeatures, NoCommunication, NoDataManager, Satellite,
    StaticTargets,
};
use st_sim::SimulatorFactory;

use crate::info::RESERVED_INFO_KEYS;
use crate::{EnvConfig, GeneralSatelliteTasking, NoopObserver, SingleSatelliteTasking, TaskingObserver};

/// Fluent builder for [`GeneralSatelliteTasking<F, O>`].
///
/// # Required inputs
///
/// - `F: SimulatorFactory` — builds one engine per episode
/// - at least one satellite
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                   |
/// |---------------------|-------------------------------------------|
/// | `.env_features(f)`  | `StaticTargets::new(0)`                   |
/// | `.data_manager(m)`  | `NoDataManager`                           |
/// | `.communicator(c)`  | `NoCommunication`                         |
/// | `.env_args(g)`      | `factory.default_env_args()`              |
/// | `.shared_args(k)`   | `["utc_init"]`                            |
/// | `.config(c)`        | `EnvConfig::default()`                    |
/// | `.observer(o)`      | `NoopObserver`                            |
///
/// User-supplied `env_args` are merged over the factory defaults: any default
/// key the user leaves out is kept.  Satellite ids must be unique and may not
/// be `d_ts` or `requires_retasking`.
pub struct TaskingBuilder<F: SimulatorFactory, O: TaskingObserver = NoopObserver> {
    factory:      F,
    satellites:   Vec<Box<dyn Satellite>>,
    env_features: Option<Box<dyn EnvironmentFeatures>>,
    data_manager: Option<Box<dyn DataManager>>,
    communicator: Option<Box<dyn Communicator>>,
    env_args:     Option<GeneratorMap>,
    shared_args:  Vec<String>,
    config:       EnvConfig,
    observer:     O,
}

impl<F: SimulatorFactory> TaskingBuilder<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            satellites:   Vec::new(),
            env_features: None,
            data_manager: None,
            communicator: None,
            env_args:     None,
            shared_args:  vec!["utc_init".to_owned()],
            config:       EnvConfig::default(),
            observer:     NoopObserver,
        }
    }
}

impl<F: SimulatorFactory, O: TaskingObserver> TaskingBuilder<F, O> {
    /// Append one satellite.  Order is the order of every tuple the
    /// environment produces.
    pub fn satellite(mut self, sat: impl Satellite + 'static) -> Self {
        self.satellites.push(Box::new(sat));
        self
    }

    pub fn satellites(mut self, sats: Vec<Box<dyn Satellite>>) -> Self {
        self.satellites.extend(sats);
        self
    }

    pub fn env_features(mut self, features: impl EnvironmentFeatures + 'static) -> Self {
        self.env_features = Some(Box::new(features));
        self
    }

    pub fn data_manager(mut self, manager: impl DataManager + 'static) -> Self {
        self.data_manager = Some(Box::new(manager));
        self
    }

    pub fn communicator(mut self, communicator: impl Communicator + 'static) -> Self {
        self.communicator = Some(Box::new(communicator));
        self
    }

    pub fn env_args(mut self, generator: GeneratorMap) -> Self {
        self.env_args = Some(generator);
        self
    }

    /// Keys of the episode arguments copied into every satellite's
    /// generator before each reset.
    pub fn shared_args<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_args = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn config(mut self, config: EnvConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the observer; changes the builder's observer type.
    pub fn observer<P: TaskingObserver>(self, observer: P) -> TaskingBuilder<F, P> {
        TaskingBuilder {
            factory:      self.factory,
            satellites:   self.satellites,
            env_features: self.env_features,
            data_manager: self.data_manager,
            communicator: self.communicator,
            env_args:     self.env_args,
            shared_args:  self.shared_args,
            config:       self.config,
            observer,
        }
    }

    /// Validate inputs and return an environment awaiting its first reset.
    pub fn build(self) -> SatResult<GeneralSatelliteTasking<F, O>> {
        if self.satellites.is_empty() {
            return Err(SatError::SatelliteCount(0));
        }
        self.config.validate()?;

        // Ids key the flat info mapping, so they must be unique and must not
        // shadow its reserved entries.
        let mut seen = HashSet::new();
        for sat in &self.satellites {
            let id = sat.id().as_str();
            if RESERVED_INFO_KEYS.contains(&id) {
                return Err(SatError::Config(format!("satellite id `{id}` is reserved")));
            }
            if !seen.insert(id) {
                return Err(SatError::Config(format!("duplicate satellite id `{id}`")));
            }
        }

        let mut env_args_generator = self.factory.default_env_args();
        if let Some(user) = self.env_args {
            for (key, generator) in user.iter() {
                env_args_generator.set(key, generator.clone());
            }
        }

        Ok(GeneralSatelliteTasking {
            satellites:           self.satellites,
            factory:              self.factory,
            env_features:         self
                .env_features
                .unwrap_or_else(|| Box::new(StaticTargets::new(0))),
            data_manager:         self.data_manager.unwrap_or_else(|| Box::new(NoDataManager)),
            communicator:         self.communicator.unwrap_or_else(|| Box::new(NoCommunication)),
            observer:             self.observer,
            config:               self.config,
            env_args_generator,
            shared_args:          self.shared_args,
            env_args:             Default::default(),
            simulator:            None,
            seed:                 None,
            latest_step_duration: 0.0,
            step_count:           0,
        })
    }

    /// Build a [`SingleSatelliteTasking`]; fails unless exactly one
    /// satellite was added.
    pub fn build_single(self) -> SatResult<SingleSatelliteTasking<F, O>> {
        match self.satellites.len() {
            1 => SingleSatelliteTasking::new(self.build()?),
            n => Err(SatError::SatelliteCount(n)),
        }
    }
}

//! Single-satellite convenience wrapper.

use st_core::{Action, Observation, SatError, SatResult, Space};
use st_satellite::Satellite;
use st_sim::SimulatorFactory;

use crate::{EnvInfo, GeneralSatelliteTasking, NoopObserver, StepResult, TaskingObserver};

/// A [`GeneralSatelliteTasking`] with exactly one satellite, whose spaces,
/// observations, and actions are that satellite's own rather than 1-tuples.
pub struct SingleSatelliteTasking<F: SimulatorFactory, O: TaskingObserver = NoopObserver> {
    inner: GeneralSatelliteTasking<F, O>,
}

impl<F: SimulatorFactory, O: TaskingObserver> SingleSatelliteTasking<F, O> {
    /// Wrap `inner`.  Fails with [`SatError::SatelliteCount`] unless it
    /// holds exactly one satellite.
    pub fn new(inner: GeneralSatelliteTasking<F, O>) -> SatResult<Self> {
        match inner.satellites.len() {
            1 => Ok(Self { inner }),
            n => Err(SatError::SatelliteCount(n)),
        }
    }

    pub fn satellite(&self) -> &dyn Satellite {
        &*self.inner.satellites[0]
    }

    pub fn action_space(&self) -> Space {
        self.satellite().action_space()
    }

    /// See [`GeneralSatelliteTasking::observation_space`]: resets once if no
    /// simulator exists yet.
    pub fn observation_space(&mut self) -> SatResult<Space> {
        match self.inner.observation_space()? {
            Space::Tuple(mut spaces) if spaces.len() == 1 => Ok(spaces.remove(0)),
            other => Ok(other),
        }
    }

    pub fn reset(&mut self, seed: Option<u64>) -> SatResult<(Observation, EnvInfo)> {
        let (obs, info) = self.inner.reset(seed)?;
        Ok((unwrap_single(obs), info))
    }

    pub fn step(&mut self, action: Option<Action>) -> SatResult<StepResult> {
        let result = self.inner.step(&[action])?;
        Ok(result.map_observation(unwrap_single))
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn inner(&self) -> &GeneralSatelliteTasking<F, O> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut GeneralSatelliteTasking<F, O> {
        &mut self.inner
    }

    pub fn into_inner(self) -> GeneralSatelliteTasking<F, O> {
        self.inner
    }
}

fn unwrap_single(obs: Observation) -> Observation {
    match obs {
        Observation::Tuple(mut parts) if parts.len() == 1 => parts.remove(0),
        other => other,
    }
}

//! A reference satellite that never acts: it coasts on a two-body orbit and
//! observes only the normalized episode time.

use serde_json::Value;
use st_core::{
    Action, ArgValue, GeneratorMap, Observation, SatError, SatResult, SatRng, SatelliteId,
    SimConfig, Space,
};
use tracing::debug;

use crate::orbit::{self, MU_EARTH, OrbitalElements, REQ_EARTH, Vec3};
use crate::{Satellite, SatelliteState};

/// Bound used for the unbounded time observation.
const OBS_BOUND: f64 = 1e16;

/// Inert satellite with a single "drift" action.
///
/// # Configuration (`sat_args`)
///
/// | Key              | Meaning                                                  |
/// |------------------|----------------------------------------------------------|
/// | `oe`             | `[a, e, i, raan, argp, f]`; `None` to use `rN`/`vN`      |
/// | `rN`, `vN`       | inertial position / velocity, used when `oe` is `None`   |
/// | `min_altitude`   | the satellite fails below this altitude (m)              |
/// | `drift_duration` | seconds a drift task lasts before retasking is requested |
/// | `utc_init`       | episode epoch, injected by the environment               |
pub struct DriftSatellite {
    state:          SatelliteState,
    r:              Vec3,
    v:              Vec3,
    time:           f64,
    normalization:  f64,
    min_altitude:   f64,
    drift_duration: f64,
    task_end:       Option<f64>,
}

impl DriftSatellite {
    pub fn new(id: impl Into<SatelliteId>, sat_args: GeneratorMap) -> Self {
        Self {
            state:          SatelliteState::new(id, sat_args),
            r:              [REQ_EARTH + 500e3, 0.0, 0.0],
            v:              [0.0; 3],
            time:           0.0,
            normalization:  1.0,
            min_altitude:   0.0,
            drift_duration: 0.0,
            task_end:       None,
        }
    }

    /// Default generator: a random 500 km orbit, 200 km failure altitude,
    /// 600 s drift tasks.  Override entries with
    /// [`GeneratorMap::with_fixed`].
    pub fn default_sat_args() -> GeneratorMap {
        GeneratorMap::new()
            .with_sampled("oe", orbit::random_orbit)
            .with_fixed("rN", ArgValue::None)
            .with_fixed("vN", ArgValue::None)
            .with_fixed("min_altitude", 200e3)
            .with_fixed("drift_duration", 600.0)
    }

    /// Height above the equatorial radius.
    pub fn altitude(&self) -> f64 {
        orbit::norm(self.r) - REQ_EARTH
    }

    pub fn position(&self) -> Vec3 {
        self.r
    }

    pub fn velocity(&self) -> Vec3 {
        self.v
    }

    fn refresh_info(&mut self) {
        let altitude = self.altitude();
        let info = &mut self.state.info;
        info.insert("altitude".into(), Value::from(altitude));
        info.insert("time".into(), Value::from(self.time));
    }
}

impl Satellite for DriftSatellite {
    fn state(&self) -> &SatelliteState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SatelliteState {
        &mut self.state
    }

    fn action_space(&self) -> Space {
        Space::Discrete { n: 1 }
    }

    fn observation_space(&self) -> Space {
        Space::uniform_box(1, -OBS_BOUND, OBS_BOUND)
    }

    fn set_action(&mut self, action: &Action) -> SatResult<()> {
        match action {
            Action::Discrete(0) => {
                self.task_end = Some(self.time + self.drift_duration);
                self.state.requires_retasking = false;
                Ok(())
            }
            other => Err(SatError::InvalidAction {
                satellite: self.state.id.clone(),
                reason:    format!("{other:?} is not a drift action"),
            }),
        }
    }

    fn get_obs(&self) -> Observation {
        Observation::Vector(vec![self.time / self.normalization])
    }

    fn is_alive(&self) -> bool {
        self.altitude() > self.min_altitude
    }

    fn reset_pre_sim(&mut self, config: &SimConfig, rng: &mut SatRng) -> SatResult<()> {
        self.state.reset(rng);
        let args = &self.state.sat_args;

        (self.r, self.v) = match args.vector("oe") {
            Some(oe) => OrbitalElements::from_slice("oe", oe)?.to_rv(MU_EARTH),
            None if args.is_unset("oe") => (args.require_array("rN")?, args.require_array("vN")?),
            None => {
                return Err(SatError::BadArg { key: "oe".into(), expected: "a vector or None" });
            }
        };
        self.min_altitude = args.require_float("min_altitude")?;
        self.drift_duration = args.require_float("drift_duration")?;
        self.normalization = if config.time_limit.is_finite() { config.time_limit } else { 1.0 };
        self.time = 0.0;
        self.task_end = None;
        self.refresh_info();

        debug!(satellite = %self.state.id, altitude = self.altitude(), "drift satellite reset");
        Ok(())
    }

    fn integrate(&mut self, sim_time: f64, dt: f64) -> SatResult<()> {
        (self.r, self.v) = orbit::rk4_two_body(MU_EARTH, self.r, self.v, dt);
        self.time = sim_time + dt;
        if let Some(end) = self.task_end {
            if self.time >= end {
                self.task_end = None;
                self.state.requires_retasking = true;
            }
        }
        self.refresh_info();
        Ok(())
    }
}

//! The `Satellite` trait — the main extension point for user code.

use st_core::{
    Action, ArgMap, GeneratorMap, Observation, SatResult, SatRng, SatelliteId, SimConfig, Space,
};

use crate::DataStore;

/// Free-form per-satellite info reported after every step.
pub type InfoMap = serde_json::Map<String, serde_json::Value>;

// ── SatelliteState ────────────────────────────────────────────────────────────

/// Bookkeeping shared by every satellite implementation.
pub struct SatelliteState {
    /// Stable, human-readable name.
    pub id: SatelliteId,

    /// Configuration generator.  The environment writes shared episode keys
    /// (e.g. `utc_init`) into it before every reset.
    pub sat_args_generator: GeneratorMap,

    /// This episode's resolved configuration.  Fixed until the next reset.
    pub sat_args: ArgMap,

    /// Set when the satellite's current task has ended (or it never had
    /// one) and it needs a new action.
    pub requires_retasking: bool,

    /// Accumulator created by the data manager at every reset.
    pub data_store: Option<Box<dyn DataStore>>,

    /// Reported under this satellite's id in the step info.
    pub info: InfoMap,
}

impl SatelliteState {
    pub fn new(id: impl Into<SatelliteId>, sat_args_generator: GeneratorMap) -> Self {
        Self {
            id: id.into(),
            sat_args_generator,
            sat_args: ArgMap::new(),
            requires_retasking: true,
            data_store: None,
            info: InfoMap::new(),
        }
    }

    /// Resolve `sat_args` for a new episode and clear per-episode state.
    pub fn reset(&mut self, rng: &mut SatRng) {
        self.sat_args = self.sat_args_generator.resolve(rng.inner());
        self.requires_retasking = true;
        self.data_store = None;
        self.info.clear();
    }
}

// ── Satellite ─────────────────────────────────────────────────────────────────

/// One independently tasked agent.
///
/// # Required methods
///
/// Spaces, action dispatch, observation, and liveness are specific to each
/// satellite family.  Everything else has a default implementation backed
/// by [`SatelliteState`].
///
/// # Lifecycle
///
/// Per episode, the environment calls [`reset_pre_sim`](Self::reset_pre_sim)
/// after building a fresh simulator, then attaches a data store, then calls
/// [`reset_post_sim`](Self::reset_post_sim).  During `step`, the simulator
/// calls [`integrate`](Self::integrate) once per engine tick.
///
/// # Example
///
/// ```rust,ignore
/// struct Pointer { state: SatelliteState, target: usize }
///
/// impl Satellite for Pointer {
///     fn state(&self) -> &SatelliteState { &self.state }
///     fn state_mut(&mut self) -> &mut SatelliteState { &mut self.state }
///     fn action_space(&self) -> Space { Space::Discrete { n: 4 } }
///     fn observation_space(&self) -> Space { Space::uniform_box(1, 0.0, 4.0) }
///     fn set_action(&mut self, action: &Action) -> SatResult<()> { .. }
///     fn get_obs(&self) -> Observation { Observation::Vector(vec![self.target as f64]) }
///     fn is_alive(&self) -> bool { true }
/// }
/// ```
pub trait Satellite: Send {
    fn state(&self) -> &SatelliteState;

    fn state_mut(&mut self) -> &mut SatelliteState;

    fn action_space(&self) -> Space;

    /// May depend on live episode state (e.g. resolved `sat_args`).
    fn observation_space(&self) -> Space;

    /// Begin executing `action`.  Implementations clear
    /// `requires_retasking` when they accept a task.
    fn set_action(&mut self, action: &Action) -> SatResult<()>;

    fn get_obs(&self) -> Observation;

    fn is_alive(&self) -> bool;

    // ── Provided ──────────────────────────────────────────────────────────

    fn id(&self) -> &SatelliteId {
        &self.state().id
    }

    fn requires_retasking(&self) -> bool {
        self.state().requires_retasking
    }

    fn set_requires_retasking(&mut self, value: bool) {
        self.state_mut().requires_retasking = value;
    }

    fn sat_args(&self) -> &ArgMap {
        &self.state().sat_args
    }

    fn sat_args_generator_mut(&mut self) -> &mut GeneratorMap {
        &mut self.state_mut().sat_args_generator
    }

    /// Called after the episode's simulator is built, before data stores
    /// exist.  The default resolves `sat_args` and raises the retasking flag.
    fn reset_pre_sim(&mut self, _config: &SimConfig, rng: &mut SatRng) -> SatResult<()> {
        self.state_mut().reset(rng);
        Ok(())
    }

    /// Called once the data store and communicator are ready.
    fn reset_post_sim(&mut self) -> SatResult<()> {
        Ok(())
    }

    fn info(&self) -> InfoMap {
        self.state().info.clone()
    }

    fn data_store(&self) -> Option<&dyn DataStore> {
        self.state().data_store.as_deref()
    }

    fn data_store_mut(&mut self) -> Option<&mut (dyn DataStore + 'static)> {
        self.state_mut().data_store.as_deref_mut()
    }

    fn attach_data_store(&mut self, store: Box<dyn DataStore>) {
        self.state_mut().data_store = Some(store);
    }

    /// Advance this satellite's own state from `sim_time` by `dt` seconds.
    ///
    /// Called by the simulator once per engine tick; `dt` is shorter on a
    /// final partial tick.  Default: nothing to integrate.
    fn integrate(&mut self, _sim_time: f64, _dt: f64) -> SatResult<()> {
        Ok(())
    }
}

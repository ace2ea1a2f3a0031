//! Tests for the episode controller.

use std::any::Any;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::RngCore;
use st_core::{
    Action, ArgMap, ArgValue, GeneratorMap, Observation, SatError, SatResult, SatRng, SimConfig,
    Space,
};
use st_satellite::{
    Communicator, DataManager, DataStore, DriftSatellite, EnvironmentFeatures, NoDataManager,
    Satellite, SatelliteState, StaticTargets,
};
use st_sim::{FixedStepFactory, Simulator, SimulatorFactory};

use crate::{
    EnvConfig, EnvInfo, GeneralSatelliteTasking, SingleSatelliteTasking, StepRecord,
    TaskingBuilder, TaskingObserver,
};

// ── Event log shared by every mock ────────────────────────────────────────────

#[derive(Default)]
struct Log(Mutex<Vec<String>>);

impl Log {
    fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    fn count_prefix(&self, prefix: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

// ── Mock satellite ────────────────────────────────────────────────────────────

/// Discrete(n_actions) satellite that observes a constant and records every
/// lifecycle call.
struct MockSat {
    state:     SatelliteState,
    n_actions: u64,
    value:     f64,
    alive:     Arc<AtomicBool>,
    log:       Arc<Log>,
}

impl Satellite for MockSat {
    fn state(&self) -> &SatelliteState { &self.state }
    fn state_mut(&mut self) -> &mut SatelliteState { &mut self.state }
    fn action_space(&self) -> Space { Space::Discrete { n: self.n_actions } }
    fn observation_space(&self) -> Space { Space::Discrete { n: self.n_actions } }

    fn set_action(&mut self, action: &Action) -> SatResult<()> {
        self.log.push(format!("set_action {} {action:?}", self.state.id));
        self.state.requires_retasking = false;
        Ok(())
    }

    fn get_obs(&self) -> Observation { Observation::Vector(vec![self.value]) }
    fn is_alive(&self) -> bool { self.alive.load(Ordering::SeqCst) }

    fn reset_pre_sim(&mut self, _config: &SimConfig, rng: &mut SatRng) -> SatResult<()> {
        self.state.reset(rng);
        self.log.push("pre_sim");
        Ok(())
    }

    fn reset_post_sim(&mut self) -> SatResult<()> {
        self.state.info.insert("sat_index".into(), self.value.into());
        self.log.push("post_sim");
        Ok(())
    }
}

// ── Mock simulator ────────────────────────────────────────────────────────────

/// Starts at `start` and advances by `advance` per run.
struct MockFactory {
    start:   f64,
    advance: f64,
    log:     Arc<Log>,
}

struct MockSim {
    time:    f64,
    advance: f64,
    log:     Arc<Log>,
}

impl SimulatorFactory for MockFactory {
    type Sim = MockSim;

    fn build(&self, _config: &SimConfig, _env_args: &ArgMap) -> SatResult<MockSim> {
        self.log.push("build");
        Ok(MockSim { time: self.start, advance: self.advance, log: self.log.clone() })
    }
}

impl Simulator for MockSim {
    fn sim_time(&self) -> f64 {
        self.time
    }

    fn run(&mut self, _satellites: &mut [Box<dyn Satellite>]) -> SatResult<()> {
        self.log.push("run");
        self.time += self.advance;
        Ok(())
    }
}

// ── Mock data, communication, world ───────────────────────────────────────────

struct MockStore {
    log: Arc<Log>,
}

impl DataStore for MockStore {
    fn internal_update(&mut self) -> SatResult<()> {
        self.log.push("internal_update");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Hands out `MockStore`s.  With `fail_at: Some(k)`, the k-th store of an
/// episode (0-based) fails to be created.
struct MockManager {
    reward:  f64,
    fail_at: Option<usize>,
    created: usize,
    log:     Arc<Log>,
}

impl MockManager {
    fn new(reward: f64, log: Arc<Log>) -> Self {
        Self { reward, fail_at: None, created: 0, log }
    }

    fn failing_at(index: usize, log: Arc<Log>) -> Self {
        Self { fail_at: Some(index), ..Self::new(0.0, log) }
    }
}

impl DataManager for MockManager {
    fn reset(&mut self) -> SatResult<()> {
        self.log.push("manager_reset");
        self.created = 0;
        Ok(())
    }

    fn create_data_store(
        &mut self,
        satellite: &dyn Satellite,
        _features: &dyn EnvironmentFeatures,
    ) -> SatResult<Box<dyn DataStore>> {
        self.log.push(format!("create_store {}", satellite.id()));
        if self.fail_at == Some(self.created) {
            return Err(SatError::Config(format!("no store for {}", satellite.id())));
        }
        self.created += 1;
        Ok(Box::new(MockStore { log: self.log.clone() }))
    }

    fn reward(&mut self, stores: &[&dyn DataStore]) -> SatResult<f64> {
        assert!(stores.iter().all(|s| s.as_any().is::<MockStore>()));
        self.log.push(format!("reward {}", stores.len()));
        Ok(self.reward)
    }
}

struct MockComm {
    log: Arc<Log>,
}

impl Communicator for MockComm {
    fn reset(&mut self) -> SatResult<()> {
        self.log.push("comm_reset");
        Ok(())
    }

    fn communicate(&mut self, _satellites: &mut [Box<dyn Satellite>]) -> SatResult<()> {
        self.log.push("communicate");
        Ok(())
    }
}

struct MockFeatures {
    log: Arc<Log>,
}

impl EnvironmentFeatures for MockFeatures {
    fn reset(&mut self, _rng: &mut dyn RngCore) -> SatResult<()> {
        self.log.push("features_reset");
        Ok(())
    }
}

// ── Recording observer ────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    resets: Vec<u64>,
    steps:  Vec<(u64, f64, bool, bool)>,
    closes: Vec<u64>,
}

impl TaskingObserver for Recorder {
    fn on_reset(&mut self, seed: u64, _satellites: &[Box<dyn Satellite>]) {
        self.resets.push(seed);
    }

    fn on_step(&mut self, record: &StepRecord<'_>, _satellites: &[Box<dyn Satellite>]) {
        self.steps.push((record.step, record.reward, record.terminated, record.truncated));
    }

    fn on_close(&mut self, steps: u64) {
        self.closes.push(steps);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

type MockEnv = GeneralSatelliteTasking<MockFactory, Recorder>;

struct Harness {
    env:    MockEnv,
    alive:  Vec<Arc<AtomicBool>>,
    log:    Arc<Log>,
}

/// `n_actions[i]` is satellite i's action count; satellite i observes `i`.
fn harness(n_actions: &[u64], start: f64, advance: f64, config: EnvConfig) -> Harness {
    let log = Arc::new(Log::default());
    let alive: Vec<Arc<AtomicBool>> =
        n_actions.iter().map(|_| Arc::new(AtomicBool::new(true))).collect();

    let mut builder = TaskingBuilder::new(MockFactory { start, advance, log: log.clone() })
        .env_features(MockFeatures { log: log.clone() })
        .data_manager(MockManager::new(25.0, log.clone()))
        .communicator(MockComm { log: log.clone() })
        .config(config)
        .observer(Recorder::default());
    for (i, (&n, alive)) in n_actions.iter().zip(&alive).enumerate() {
        builder = builder.satellite(MockSat {
            state:     SatelliteState::new(format!("sat-{i}"), GeneratorMap::new()),
            n_actions: n,
            value:     i as f64,
            alive:     alive.clone(),
            log:       log.clone(),
        });
    }
    Harness { env: builder.build().unwrap(), alive, log }
}

fn two_sats() -> Harness {
    harness(&[1, 11], 0.0, 0.0, EnvConfig::default())
}

fn config_with_limit(time_limit: f64, terminate_on_time_limit: bool) -> EnvConfig {
    EnvConfig { time_limit, terminate_on_time_limit, ..EnvConfig::default() }
}

/// In-memory sink for `tracing` output.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = Captured::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&buf.0.lock().unwrap()).into_owned();
    (out, text)
}

// ── Episode arguments ─────────────────────────────────────────────────────────

#[cfg(test)]
mod env_args_tests {
    use super::*;

    #[test]
    fn resolves_fixed_and_sampled_entries() {
        let log = Arc::new(Log::default());
        let mut env = TaskingBuilder::new(MockFactory { start: 0.0, advance: 0.0, log: log.clone() })
            .satellite(MockSat {
                state:     SatelliteState::new("a", GeneratorMap::new()),
                n_actions: 1,
                value:     0.0,
                alive:     Arc::new(AtomicBool::new(true)),
                log:       log.clone(),
            })
            .env_args(
                GeneratorMap::new()
                    .with_fixed("a", 1i64)
                    .with_sampled("b", |_| ArgValue::Int(2)),
            )
            .build()
            .unwrap();
        env.reset(Some(0)).unwrap();
        assert_eq!(env.env_args().int("a"), Some(1));
        assert_eq!(env.env_args().int("b"), Some(2));
    }

    #[test]
    fn factory_defaults_fill_missing_keys() {
        let mut h = two_sats();
        h.env.reset(Some(4)).unwrap();
        assert!(h.env.env_args().int("utc_init").is_some());
    }

    #[test]
    fn shared_keys_reach_every_satellite() {
        let mut h = two_sats();
        h.env.env_args_generator.set("utc_init", ArgValue::from("a long time ago").into());
        h.env.reset(None).unwrap();
        assert_eq!(h.env.env_args().get("utc_init"), Some(&ArgValue::from("a long time ago")));
        for sat in h.env.satellites() {
            assert_eq!(sat.sat_args().get("utc_init"), h.env.env_args().get("utc_init"));
        }
    }

    #[test]
    fn missing_shared_key_is_an_error() {
        let log = Arc::new(Log::default());
        let mut env = TaskingBuilder::new(MockFactory { start: 0.0, advance: 0.0, log: log.clone() })
            .satellite(MockSat {
                state:     SatelliteState::new("a", GeneratorMap::new()),
                n_actions: 1,
                value:     0.0,
                alive:     Arc::new(AtomicBool::new(true)),
                log,
            })
            .shared_args(["utc_init", "ground_stations"])
            .build()
            .unwrap();
        let err = env.reset(Some(0)).unwrap_err();
        assert!(matches!(err, SatError::MissingArg(ref key) if key == "ground_stations"));
    }

    #[test]
    fn same_seed_same_arguments() {
        let mut h = two_sats();
        h.env.reset(Some(99)).unwrap();
        let first = h.env.env_args().clone();
        h.env.reset(Some(99)).unwrap();
        assert_eq!(h.env.env_args(), &first);
    }

    #[test]
    fn different_seeds_draw_different_epochs() {
        let mut h = two_sats();
        h.env.reset(Some(1)).unwrap();
        let first = h.env.env_args().int("utc_init");
        h.env.reset(Some(2)).unwrap();
        assert_ne!(h.env.env_args().int("utc_init"), first);
    }
}

// ── reset ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reset_tests {
    use super::*;

    #[test]
    fn runs_hooks_in_order() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        assert_eq!(
            h.log.events(),
            vec![
                "features_reset",
                "build",
                "pre_sim",
                "pre_sim",
                "manager_reset",
                "create_store sat-0",
                "create_store sat-1",
                "comm_reset",
                "post_sim",
                "post_sim",
            ]
        );
    }

    #[test]
    fn returns_composed_observation_and_info() {
        let mut h = harness(&[1, 1, 1], 0.0, 0.0, EnvConfig::default());
        let (obs, info) = h.env.reset(Some(0)).unwrap();
        assert_eq!(
            obs,
            Observation::Tuple(vec![
                Observation::Vector(vec![0.0]),
                Observation::Vector(vec![1.0]),
                Observation::Vector(vec![2.0]),
            ])
        );
        assert_eq!(info.d_ts, 0.0);
        assert_eq!(info.satellites.len(), 3);
        assert_eq!(info.requires_retasking.len(), 3);
        assert_eq!(info.satellite("sat-2").unwrap()["sat_index"], 2.0);
    }

    #[test]
    fn every_satellite_gets_a_data_store() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        assert!(h.env.satellites().iter().all(|s| s.data_store().is_some()));
    }

    #[test]
    fn failed_reset_leaves_nothing_to_step() {
        let mut h = two_sats();
        h.env.data_manager = Box::new(MockManager::failing_at(1, h.log.clone()));

        let err = h.env.reset(Some(0)).unwrap_err();
        assert!(matches!(err, SatError::Config(_)));
        assert!(h.env.simulator().is_none());
        assert_eq!(h.log.count("post_sim"), 0);
        assert!(matches!(h.env.step(&[None, None]), Err(SatError::NotReset)));
        assert_eq!(h.log.count("run"), 0);
    }

    #[test]
    fn failed_reset_drops_previous_episode() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.env.step(&[None, None]).unwrap();
        assert!(h.env.simulator().is_some());

        h.env.data_manager = Box::new(MockManager::failing_at(0, h.log.clone()));
        assert!(h.env.reset(Some(1)).is_err());
        assert!(h.env.simulator().is_none());
        assert!(matches!(h.env.step(&[None, None]), Err(SatError::NotReset)));

        h.env.data_manager = Box::new(MockManager::new(25.0, h.log.clone()));
        h.env.reset(Some(1)).unwrap();
        assert_eq!(h.env.step(&[None, None]).unwrap().reward, 25.0);
    }

    #[test]
    fn satellite_without_store_cannot_be_rewarded() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.env.satellites[1].state_mut().data_store = None;
        h.log.clear();

        assert!(matches!(h.env.step(&[None, None]), Err(SatError::NotReset)));
        assert_eq!(h.log.count_prefix("reward"), 0);
    }

    #[test]
    fn unseeded_reset_stores_its_seed() {
        let mut h = two_sats();
        assert_eq!(h.env.seed(), None);
        h.env.reset(None).unwrap();
        let seed = h.env.seed().unwrap();
        let args = h.env.env_args().clone();
        h.env.reset(Some(seed)).unwrap();
        assert_eq!(h.env.env_args(), &args);
        assert_eq!(h.env.observer().resets, vec![seed, seed]);
    }

    #[test]
    fn reset_builds_a_fresh_simulator() {
        let mut h = harness(&[1], 0.0, 5.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();
        h.env.step(&[Some(Action::Discrete(0))]).unwrap();
        assert_eq!(h.env.simulator().unwrap().sim_time(), 5.0);

        h.env.reset(Some(0)).unwrap();
        assert_eq!(h.log.count("build"), 2);
        assert_eq!(h.env.simulator().unwrap().sim_time(), 0.0);
        assert_eq!(h.env.latest_step_duration(), 0.0);
        assert_eq!(h.env.step_count(), 0);
    }

    #[test]
    fn reset_raises_retasking_flag() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.env.step(&[Some(Action::Discrete(0)), Some(Action::Discrete(3))]).unwrap();
        assert!(h.env.satellites().iter().all(|s| !s.requires_retasking()));
        h.env.reset(Some(0)).unwrap();
        assert!(h.env.satellites().iter().all(|s| s.requires_retasking()));
    }
}

// ── Spaces ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod space_tests {
    use super::*;

    fn discrete_tuple() -> Space {
        Space::Tuple(vec![
            Space::Discrete { n: 1 },
            Space::Discrete { n: 2 },
            Space::Discrete { n: 3 },
        ])
    }

    #[test]
    fn action_space_is_tuple_in_order() {
        let h = harness(&[1, 2, 3], 0.0, 0.0, EnvConfig::default());
        assert_eq!(h.env.action_space(), discrete_tuple());
    }

    #[test]
    fn observation_space_without_simulator_resets_once_with_stored_seed() {
        let mut h = harness(&[1, 2, 3], 0.0, 0.0, EnvConfig::default());
        h.env.seed = Some(123);
        assert_eq!(h.env.observation_space().unwrap(), discrete_tuple());
        assert_eq!(h.log.count("build"), 1);
        assert_eq!(h.env.observer().resets, vec![123]);

        assert_eq!(h.env.observation_space().unwrap(), discrete_tuple());
        assert_eq!(h.log.count("build"), 1);
    }

    #[test]
    fn observation_space_with_simulator_does_not_reset() {
        let mut h = harness(&[1, 2, 3], 0.0, 0.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();
        h.log.clear();
        assert_eq!(h.env.observation_space().unwrap(), discrete_tuple());
        assert!(h.log.events().is_empty());
        assert_eq!(h.env.observer().resets.len(), 1);
    }
}

// ── step ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use super::*;

    #[test]
    fn dispatches_runs_updates_and_rewards() {
        let mut h = harness(&[1, 11], 101.0, 0.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();
        h.log.clear();

        let result = h.env.step(&[Some(Action::Discrete(0)), Some(Action::Discrete(10))]).unwrap();
        assert_eq!(
            h.log.events(),
            vec![
                "set_action sat-0 Discrete(0)",
                "set_action sat-1 Discrete(10)",
                "run",
                "internal_update",
                "internal_update",
                "communicate",
                "reward 2",
            ]
        );
        assert_eq!(h.env.latest_step_duration(), 0.0);
        assert_eq!(result.reward, 25.0);
        assert!(!result.terminated);
        assert!(!result.truncated);
    }

    #[test]
    fn duration_is_measured_around_run() {
        let mut h = harness(&[1], 0.0, 10.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();
        let result = h.env.step(&[None]).unwrap();
        assert_eq!(h.env.latest_step_duration(), 10.0);
        assert_eq!(result.info.d_ts, 10.0);
    }

    #[test]
    fn wrong_action_count_is_rejected_before_dispatch() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.log.clear();

        let three = [Some(Action::Discrete(0)), Some(Action::Discrete(10)), None];
        let err = h.env.step(&three).unwrap_err();
        assert!(matches!(err, SatError::ActionCountMismatch { expected: 2, got: 3 }));

        let err = h.env.step(&[Some(Action::Discrete(0))]).unwrap_err();
        assert!(matches!(err, SatError::ActionCountMismatch { expected: 2, got: 1 }));
        assert!(h.log.events().is_empty());
    }

    #[test]
    fn invalid_action_is_rejected_before_dispatch() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.log.clear();

        let err = h
            .env
            .step(&[Some(Action::Discrete(0)), Some(Action::Discrete(20))])
            .unwrap_err();
        assert!(matches!(err, SatError::InvalidAction { ref satellite, .. } if satellite.as_str() == "sat-1"));
        assert!(h.log.events().is_empty());
    }

    #[test]
    fn step_before_reset_fails() {
        let mut h = two_sats();
        let err = h.env.step(&[None, None]).unwrap_err();
        assert!(matches!(err, SatError::NotReset));
    }

    #[test]
    fn termination_and_truncation_flags() {
        for sat_death in [true, false] {
            for timeout in [true, false] {
                for terminate_on_time_limit in [true, false] {
                    let limit = if timeout { 100.0 } else { 1000.0 };
                    let mut h =
                        harness(&[1, 11], 101.0, 0.0, config_with_limit(limit, terminate_on_time_limit));
                    h.env.reset(Some(0)).unwrap();
                    if sat_death {
                        h.alive[1].store(false, Ordering::SeqCst);
                    }

                    let result = h
                        .env
                        .step(&[Some(Action::Discrete(0)), Some(Action::Discrete(10))])
                        .unwrap();
                    assert_eq!(
                        result.terminated,
                        sat_death || (timeout && terminate_on_time_limit),
                        "death={sat_death} timeout={timeout} term={terminate_on_time_limit}"
                    );
                    assert_eq!(result.truncated, timeout);
                }
            }
        }
    }

    #[test]
    fn time_limit_is_inclusive() {
        let mut h = harness(&[1], 0.0, 50.0, config_with_limit(100.0, false));
        h.env.reset(Some(0)).unwrap();
        assert!(!h.env.step(&[None]).unwrap().truncated);
        assert!(h.env.step(&[None]).unwrap().truncated);
    }

    #[test]
    fn failure_penalty_per_dead_satellite() {
        let mut h = harness(&[1, 1, 1], 0.0, 1.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();

        h.alive[0].store(false, Ordering::SeqCst);
        let one_dead = h.env.step(&[None, None, None]).unwrap();
        assert_eq!(one_dead.reward, 25.0 - 100.0);

        h.alive[2].store(false, Ordering::SeqCst);
        let two_dead = h.env.step(&[None, None, None]).unwrap();
        assert_eq!(two_dead.reward, 25.0 - 200.0);
        assert!(two_dead.terminated);
    }

    #[test]
    fn info_lists_satellites_awaiting_tasks() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        let result = h.env.step(&[Some(Action::Discrete(0)), None]).unwrap();
        let ids: Vec<&str> = result.info.requires_retasking.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["sat-1"]);
    }

    #[test]
    fn observer_sees_every_step() {
        let mut h = harness(&[1], 0.0, 1.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();
        h.env.step(&[None]).unwrap();
        h.env.step(&[None]).unwrap();
        let steps: Vec<u64> = h.env.observer().steps.iter().map(|s| s.0).collect();
        assert_eq!(steps, vec![1, 2]);
        assert_eq!(h.env.step_count(), 2);
    }

    #[test]
    fn missing_task_is_warned_not_raised() {
        let mut h = harness(&[1], 0.0, 1.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();
        assert!(h.env.satellites()[0].requires_retasking());

        let (result, logs) = capture_logs(|| h.env.step(&[None]));
        result.unwrap();
        assert!(logs.contains("requires retasking but received no task"), "{logs}");
        assert!(h.env.satellites()[0].requires_retasking());
        assert_eq!(h.log.count_prefix("set_action"), 0);
    }

    #[test]
    fn no_warning_once_tasked() {
        let mut h = harness(&[1], 0.0, 1.0, EnvConfig::default());
        h.env.reset(Some(0)).unwrap();
        h.env.step(&[Some(Action::Discrete(0))]).unwrap();

        let (result, logs) = capture_logs(|| h.env.step(&[None]));
        result.unwrap();
        assert!(!logs.contains("requires retasking"), "{logs}");
    }
}

// ── close ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod close_tests {
    use super::*;

    #[test]
    fn close_drops_simulator() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.env.close();
        assert!(h.env.simulator().is_none());
        assert!(matches!(h.env.step(&[None, None]).unwrap_err(), SatError::NotReset));
    }

    #[test]
    fn close_is_idempotent() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.env.step(&[None, None]).unwrap();
        h.env.close();
        h.env.close();
        assert_eq!(h.env.observer().closes, vec![1]);
    }

    #[test]
    fn reset_after_close_restores_stepping() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        h.env.close();
        h.env.reset(Some(0)).unwrap();
        assert!(h.env.step(&[None, None]).is_ok());
    }

    #[test]
    fn into_observer_closes() {
        let mut h = two_sats();
        h.env.reset(Some(0)).unwrap();
        let recorder = h.env.into_observer();
        assert_eq!(recorder.closes, vec![0]);
    }
}

// ── Single-satellite wrapper ──────────────────────────────────────────────────

#[cfg(test)]
mod single_tests {
    use super::*;

    fn single() -> (SingleSatelliteTasking<MockFactory, Recorder>, Arc<Log>) {
        let h = harness(&[3], 0.0, 1.0, EnvConfig::default());
        (SingleSatelliteTasking::new(h.env).unwrap(), h.log)
    }

    #[test]
    fn rejects_more_than_one_satellite() {
        let h = two_sats();
        assert!(matches!(SingleSatelliteTasking::new(h.env), Err(SatError::SatelliteCount(2))));
    }

    #[test]
    fn build_single_checks_count() {
        let log = Arc::new(Log::default());
        let sat = |name: &str| MockSat {
            state:     SatelliteState::new(name, GeneratorMap::new()),
            n_actions: 1,
            value:     0.0,
            alive:     Arc::new(AtomicBool::new(true)),
            log:       log.clone(),
        };
        let result = TaskingBuilder::new(MockFactory { start: 0.0, advance: 0.0, log: log.clone() })
            .satellite(sat("a"))
            .satellite(sat("b"))
            .build_single();
        assert!(matches!(result, Err(SatError::SatelliteCount(2))));
    }

    #[test]
    fn spaces_are_unwrapped() {
        let (mut env, _) = single();
        assert_eq!(env.action_space(), Space::Discrete { n: 3 });
        assert_eq!(env.observation_space().unwrap(), Space::Discrete { n: 3 });
        assert_eq!(env.satellite().id().as_str(), "sat-0");
    }

    #[test]
    fn step_delegates_one_element_action() {
        let (mut env, log) = single();
        let (obs, _) = env.reset(Some(0)).unwrap();
        assert_eq!(obs, Observation::Vector(vec![0.0]));

        let result = env.step(Some(Action::Discrete(2))).unwrap();
        assert_eq!(log.count("set_action sat-0 Discrete(2)"), 1);
        assert_eq!(result.observation, Observation::Vector(vec![0.0]));
    }

    #[test]
    fn repeated_missing_task_keeps_flag() {
        let (mut env, _) = single();
        env.reset(Some(0)).unwrap();
        env.step(None).unwrap();
        assert!(env.satellite().requires_retasking());
        env.step(None).unwrap();
        assert!(env.satellite().requires_retasking());
    }
}

// ── Configuration and info serialization ──────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EnvConfig::default();
        assert_eq!(config.sim_rate, 1.0);
        assert_eq!(config.max_step_duration, 600.0);
        assert!(config.time_limit.is_infinite());
        assert!(!config.terminate_on_time_limit);
        assert_eq!(config.failure_penalty, -100.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EnvConfig::from_json_str(r#"{ "time_limit": 100.0, "max_step_duration": 10.0 }"#).unwrap();
        assert_eq!(config.time_limit, 100.0);
        assert_eq!(config.max_step_duration, 10.0);
        assert_eq!(config.failure_penalty, -100.0);
    }

    #[test]
    fn null_time_limit_is_unlimited() {
        let config = EnvConfig::from_json_str(r#"{ "time_limit": null }"#).unwrap();
        assert!(config.time_limit.is_infinite());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(EnvConfig::from_json_str(r#"{ "sim_rat": 1.0 }"#), Err(SatError::Json(_))));
    }

    #[test]
    fn validate_rejects_bad_timing() {
        for bad in [
            EnvConfig { sim_rate: 0.0, ..EnvConfig::default() },
            EnvConfig { max_step_duration: -1.0, ..EnvConfig::default() },
            EnvConfig { time_limit: 0.0, ..EnvConfig::default() },
            EnvConfig { time_limit: f64::NAN, ..EnvConfig::default() },
        ] {
            assert!(matches!(bad.validate(), Err(SatError::Config(_))), "{bad:?}");
        }
    }

    #[test]
    fn builder_validates_config() {
        let log = Arc::new(Log::default());
        let result = TaskingBuilder::new(MockFactory { start: 0.0, advance: 0.0, log: log.clone() })
            .satellite(MockSat {
                state:     SatelliteState::new("a", GeneratorMap::new()),
                n_actions: 1,
                value:     0.0,
                alive:     Arc::new(AtomicBool::new(true)),
                log,
            })
            .config(EnvConfig { sim_rate: -1.0, ..EnvConfig::default() })
            .build();
        assert!(matches!(result, Err(SatError::Config(_))));
    }

    #[test]
    fn builder_requires_a_satellite() {
        let log = Arc::new(Log::default());
        let result = TaskingBuilder::new(MockFactory { start: 0.0, advance: 0.0, log }).build();
        assert!(matches!(result, Err(SatError::SatelliteCount(0))));
    }

    fn named(names: &[&str]) -> SatResult<GeneralSatelliteTasking<MockFactory>> {
        let log = Arc::new(Log::default());
        let factory = MockFactory { start: 0.0, advance: 0.0, log: log.clone() };
        let mut builder = TaskingBuilder::new(factory);
        for name in names {
            builder = builder.satellite(MockSat {
                state:     SatelliteState::new(*name, GeneratorMap::new()),
                n_actions: 1,
                value:     0.0,
                alive:     Arc::new(AtomicBool::new(true)),
                log:       log.clone(),
            });
        }
        builder.build()
    }

    #[test]
    fn builder_rejects_duplicate_ids() {
        assert!(named(&["EO-1", "EO-2"]).is_ok());
        let err = named(&["EO-1", "EO-2", "EO-1"]).err().unwrap();
        assert!(matches!(err, SatError::Config(msg) if msg.contains("EO-1")));
    }

    #[test]
    fn builder_rejects_reserved_ids() {
        for key in crate::RESERVED_INFO_KEYS {
            let err = named(&["EO-1", key]).err().unwrap();
            assert!(matches!(err, SatError::Config(msg) if msg.contains("reserved")));
        }
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.json");
        std::fs::write(&path, r#"{ "sim_rate": 0.5, "terminate_on_time_limit": true }"#).unwrap();
        let config = EnvConfig::from_path(&path).unwrap();
        assert_eq!(config.sim_rate, 0.5);
        assert!(config.terminate_on_time_limit);
        assert_eq!(config.sim_config().sim_rate, 0.5);
    }

    #[test]
    fn info_serializes_flat() {
        let mut sat_info = st_satellite::InfoMap::new();
        sat_info.insert("sat_index".into(), 0.into());
        let info = EnvInfo {
            satellites:         vec![("EO-1".into(), sat_info)],
            d_ts:               10.0,
            requires_retasking: vec!["EO-1".into()],
        };
        assert_eq!(
            info.to_json(),
            serde_json::json!({
                "EO-1": { "sat_index": 0 },
                "d_ts": 10.0,
                "requires_retasking": ["EO-1"],
            })
        );
    }
}

// ── End to end with the reference plug-ins ────────────────────────────────────

#[cfg(test)]
mod drift_episode_tests {
    use super::*;

    fn drift(name: &str) -> DriftSatellite {
        DriftSatellite::new(name, DriftSatellite::default_sat_args())
    }

    fn short_episode() -> EnvConfig {
        EnvConfig {
            sim_rate:          1.0,
            max_step_duration: 10.0,
            time_limit:        100.0,
            ..EnvConfig::default()
        }
    }

    fn single_env() -> SingleSatelliteTasking<FixedStepFactory> {
        TaskingBuilder::new(FixedStepFactory)
            .satellite(drift("Sputnik"))
            .env_features(StaticTargets::new(0))
            .data_manager(NoDataManager)
            .config(short_episode())
            .build_single()
            .unwrap()
    }

    #[test]
    fn single_satellite_episode() {
        let mut env = single_env();
        assert_eq!(env.action_space(), Space::Discrete { n: 1 });
        assert_eq!(env.observation_space().unwrap(), Space::uniform_box(1, -1e16, 1e16));

        let (obs, _) = env.reset(None).unwrap();
        assert_eq!(obs, Observation::Vector(vec![0.0]));
        assert!(env.observation_space().unwrap().contains_observation(&obs));
        assert!(obs.parts().is_none());

        let result = env.step(Some(Action::Discrete(0))).unwrap();
        assert_eq!(result.observation, Observation::Vector(vec![0.1]));

        let mut done = result.done();
        let mut last = result;
        while !done {
            last = env.step(Some(Action::Discrete(0))).unwrap();
            done = last.done();
        }
        assert!(last.truncated);
        assert!(!last.terminated);
        assert_eq!(env.inner().simulator().unwrap().sim_time(), 100.0);
    }

    #[test]
    fn single_satellite_reset_is_repeatable() {
        let mut env = single_env();
        env.reset(Some(0)).unwrap();
        let env_args = env.inner().env_args().clone();
        let sat_args = env.satellite().sat_args().clone();

        env.reset(Some(0)).unwrap();
        assert_eq!(env.inner().env_args(), &env_args);
        assert_eq!(env.satellite().sat_args(), &sat_args);
    }

    #[test]
    fn falling_satellite_terminates_with_penalty() {
        let args = DriftSatellite::default_sat_args()
            .with_fixed("oe", ArgValue::None)
            .with_fixed("rN", [0.0, 0.0, 7e6])
            .with_fixed("vN", [0.0, 0.0, -100.0]);
        let mut env = TaskingBuilder::new(FixedStepFactory)
            .satellite(DriftSatellite::new("Skydiver", args))
            .env_features(StaticTargets::new(0))
            .data_manager(NoDataManager)
            .config(EnvConfig {
                time_limit:      1000.0,
                failure_penalty: -1000.0,
                ..EnvConfig::default()
            })
            .build_single()
            .unwrap();

        env.reset(None).unwrap();
        let result = env.step(Some(Action::Discrete(0))).unwrap();
        assert!(result.terminated);
        assert!(!result.truncated);
        assert_eq!(result.reward, -1000.0);
        env.close();
        assert!(env.inner().simulator().is_none());
    }

    #[test]
    fn multi_satellite_episode() {
        let mut env = TaskingBuilder::new(FixedStepFactory)
            .satellite(drift("Sentinel-2A"))
            .satellite(drift("Sentinel-2B"))
            .env_features(StaticTargets::new(0))
            .data_manager(NoDataManager)
            .config(short_episode())
            .build()
            .unwrap();

        let (obs, _) = env.reset(None).unwrap();
        let zero = Observation::Vector(vec![0.0]);
        assert_eq!(obs, Observation::Tuple(vec![zero.clone(), zero]));
        assert_eq!(
            env.action_space(),
            Space::Tuple(vec![Space::Discrete { n: 1 }, Space::Discrete { n: 1 }])
        );
        let obs_space = Space::uniform_box(1, -1e16, 1e16);
        assert_eq!(
            env.observation_space().unwrap(),
            Space::Tuple(vec![obs_space.clone(), obs_space])
        );

        let both = [Some(Action::Discrete(0)), Some(Action::Discrete(0))];
        let result = env.step(&both).unwrap();
        let tenth = Observation::Vector(vec![0.1]);
        assert_eq!(result.observation, Observation::Tuple(vec![tenth.clone(), tenth]));
        assert!(env.observation_space().unwrap().contains_observation(&result.observation));

        let mut last = result;
        while !last.done() {
            last = env.step(&both).unwrap();
        }
        assert!(last.truncated);
        assert_eq!(env.simulator().unwrap().sim_time(), 100.0);
        let parts = last.observation.parts().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.as_slice().is_some_and(|v| v[0] > 0.1)));
        assert_eq!(last.info.satellites.len(), 2);
        assert!(last.info.satellite("Sentinel-2B").unwrap().contains_key("altitude"));
    }
}

//! drift — smallest end-to-end run of the sat_tasking framework.
//!
//! Flies two inert satellites on random 500 km orbits for one orbit period,
//! re-issuing the drift task whenever a satellite asks for one, then drops a
//! third satellite straight down to show failure termination.  Step and
//! snapshot rows land in CSV files under the output directory.
//!
//! ```text
//! drift [ENV_CONFIG.json] [OUTPUT_DIR]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::any::Any;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use st_core::{Action, ArgValue, SatResult};
use st_env::{EnvConfig, TaskingBuilder};
use st_output::{CsvWriter, StepOutputObserver};
use st_satellite::{DataManager, DataStore, DriftSatellite, EnvironmentFeatures, Satellite, StaticTargets};
use st_sim::{FixedStepFactory, Simulator};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:          u64   = 42;
const ORBIT_PERIOD:  f64   = 5_677.0; // 500 km circular orbit, seconds
const N_TARGETS:     usize = 16;
const STEP_REWARD:   f64   = 0.01;

// ── Data manager ──────────────────────────────────────────────────────────────

/// Counts the steps a satellite has been simulated through.
struct StepTally {
    steps: u64,
}

impl DataStore for StepTally {
    fn internal_update(&mut self) -> SatResult<()> {
        self.steps += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Small fixed reward per satellite per step.
struct TallyManager;

impl DataManager for TallyManager {
    fn create_data_store(
        &mut self,
        _satellite: &dyn Satellite,
        _features:  &dyn EnvironmentFeatures,
    ) -> SatResult<Box<dyn DataStore>> {
        Ok(Box::new(StepTally { steps: 0 }))
    }

    fn reward(&mut self, stores: &[&dyn DataStore]) -> SatResult<f64> {
        let tallied = stores
            .iter()
            .filter_map(|s| s.as_any().downcast_ref::<StepTally>())
            .filter(|t| t.steps > 0)
            .count();
        Ok(tallied as f64 * STEP_REWARD)
    }
}

// ── Episodes ──────────────────────────────────────────────────────────────────

fn drift_episode(config: EnvConfig, out_dir: &Path) -> Result<()> {
    let writer = CsvWriter::new(out_dir)
        .with_context(|| format!("opening CSV output in {}", out_dir.display()))?;

    let mut env = TaskingBuilder::new(FixedStepFactory)
        .satellite(DriftSatellite::new("Sentinel-2A", DriftSatellite::default_sat_args()))
        .satellite(DriftSatellite::new("Sentinel-2B", DriftSatellite::default_sat_args()))
        .env_features(StaticTargets::new(N_TARGETS))
        .data_manager(TallyManager)
        .config(config)
        .observer(StepOutputObserver::new(writer))
        .build()?;

    println!("Action space:      {:?}", env.action_space());
    println!("Observation space: {:?}", env.observation_space()?);

    let (_, info) = env.reset(Some(SEED))?;
    println!("Targets placed:    {}", env.env_features().targets().len());
    println!("Initial info:      {}", info.to_json());

    let started = Instant::now();
    let mut total_reward = 0.0;
    loop {
        // Re-task only the satellites that asked for it.
        let actions: Vec<Option<Action>> = env
            .satellites()
            .iter()
            .map(|s| s.requires_retasking().then_some(Action::Discrete(0)))
            .collect();
        let result = env.step(&actions)?;
        total_reward += result.reward;
        if result.done() {
            println!(
                "Episode ended after {} steps at t = {:.1} s (terminated={}, truncated={})",
                env.step_count(),
                env.simulator().map(Simulator::sim_time).unwrap_or_default(),
                result.terminated,
                result.truncated,
            );
            break;
        }
    }
    println!("Total reward:      {total_reward:.2}");
    println!("Wall time:         {:.1?}", started.elapsed());

    let mut observer = env.into_observer();
    if let Some(err) = observer.take_error() {
        bail!("output error: {err}");
    }
    Ok(())
}

fn skydiver_episode() -> Result<()> {
    let args = DriftSatellite::default_sat_args()
        .with_fixed("oe", ArgValue::None)
        .with_fixed("rN", [0.0, 0.0, 7e6])
        .with_fixed("vN", [0.0, 0.0, -100.0]);

    let mut env = TaskingBuilder::new(FixedStepFactory)
        .satellite(DriftSatellite::new("Skydiver", args))
        .config(EnvConfig {
            time_limit:      1_000.0,
            failure_penalty: -1_000.0,
            ..EnvConfig::default()
        })
        .build_single()?;

    env.reset(Some(SEED))?;
    let result = env.step(Some(Action::Discrete(0)))?;
    println!(
        "Skydiver: terminated={} reward={} info={}",
        result.terminated,
        result.reward,
        result.info.to_json()
    );
    env.close();
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EnvConfig::from_path(Path::new(&path))
            .with_context(|| format!("loading environment config {path}"))?,
        None => EnvConfig {
            max_step_duration: 300.0,
            time_limit:        ORBIT_PERIOD,
            ..EnvConfig::default()
        },
    };
    if !config.time_limit.is_finite() {
        bail!("drift satellites never fail on their own; set a finite time_limit");
    }
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("output"));
    std::fs::create_dir_all(&out_dir)?;

    println!("=== drift — sat_tasking ===");
    println!("Seed: {SEED}  |  Time limit: {} s  |  Output: {}", config.time_limit, out_dir.display());
    println!();

    drift_episode(config, &out_dir)?;
    println!();
    skydiver_episode()?;
    Ok(())
}

//! World content consumed by satellites and data stores.

use std::f64::consts::TAU;

use rand::{Rng, RngCore};
use st_core::{SatError, SatResult, TargetId};

use crate::orbit::REQ_EARTH;

/// A ground location of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id:       TargetId,
    pub name:     String,
    /// Earth-fixed position in metres.
    pub position: [f64; 3],
    /// Relative value in (0, 1].
    pub priority: f64,
}

/// Generator of world content, regenerated at every reset.
pub trait EnvironmentFeatures: Send {
    fn reset(&mut self, rng: &mut dyn RngCore) -> SatResult<()>;

    /// Targets placed for the current episode.
    fn targets(&self) -> &[Target] {
        &[]
    }
}

/// A fixed number of targets scattered uniformly over the Earth's surface.
pub struct StaticTargets {
    n_targets: usize,
    targets:   Vec<Target>,
}

impl StaticTargets {
    pub fn new(n_targets: usize) -> Self {
        Self { n_targets, targets: Vec::new() }
    }
}

impl EnvironmentFeatures for StaticTargets {
    fn reset(&mut self, rng: &mut dyn RngCore) -> SatResult<()> {
        let count = u32::try_from(self.n_targets).map_err(|_| {
            SatError::Config(format!("{} targets exceed the target id range", self.n_targets))
        })?;
        self.targets = (0..count)
            .map(|i| {
                // Uniform on the sphere: uniform z, uniform longitude.
                let z: f64 = rng.gen_range(-1.0..=1.0);
                let lon: f64 = rng.gen_range(0.0..TAU);
                let rho = (1.0 - z * z).sqrt();
                Target {
                    id:       TargetId(i),
                    name:     format!("tgt-{i}"),
                    position: [
                        REQ_EARTH * rho * lon.cos(),
                        REQ_EARTH * rho * lon.sin(),
                        REQ_EARTH * z,
                    ],
                    priority: 1.0 - rng.gen_range(0.0..1.0),
                }
            })
            .collect();
        Ok(())
    }

    fn targets(&self) -> &[Target] {
        &self.targets
    }
}

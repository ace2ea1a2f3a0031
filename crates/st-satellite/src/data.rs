//! Data accumulation and reward.
//!
//! # Design
//!
//! Each satellite owns one [`DataStore`], created fresh by the
//! [`DataManager`] at every reset.  After each simulation advance the
//! environment calls [`DataStore::internal_update`] on every store (in
//! satellite order), then asks the manager for the step reward over all of
//! them.  The manager is the sole authority on reward semantics.
//!
//! Stores are type-erased; a manager recovers its own concrete store type
//! with `store.as_any().downcast_ref::<MyStore>()`.

use std::any::Any;

use st_core::SatResult;

use crate::{EnvironmentFeatures, Satellite};

/// Per-satellite accumulator of simulation output.
pub trait DataStore: Any + Send {
    /// Fold the newly simulated interval into the accumulated data.
    fn internal_update(&mut self) -> SatResult<()>;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Creates data stores and turns them into a scalar reward.
pub trait DataManager: Send {
    /// Called once per reset, before any store is created.
    fn reset(&mut self) -> SatResult<()> {
        Ok(())
    }

    /// Build the store for `satellite`, bound to this episode's world.
    fn create_data_store(
        &mut self,
        satellite: &dyn Satellite,
        features:  &dyn EnvironmentFeatures,
    ) -> SatResult<Box<dyn DataStore>>;

    /// Reward for the step just simulated.  `stores` is in satellite order.
    fn reward(&mut self, stores: &[&dyn DataStore]) -> SatResult<f64>;
}

// ── No-op implementations ─────────────────────────────────────────────────────

/// A store that records nothing.
pub struct NoDataStore;

impl DataStore for NoDataStore {
    fn internal_update(&mut self) -> SatResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A [`DataManager`] whose reward is always zero.
pub struct NoDataManager;

impl DataManager for NoDataManager {
    fn create_data_store(
        &mut self,
        _satellite: &dyn Satellite,
        _features:  &dyn EnvironmentFeatures,
    ) -> SatResult<Box<dyn DataStore>> {
        Ok(Box::new(NoDataStore))
    }

    fn reward(&mut self, _stores: &[&dyn DataStore]) -> SatResult<f64> {
        Ok(0.0)
    }
}

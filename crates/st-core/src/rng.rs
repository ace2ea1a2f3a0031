//! Deterministic per-satellite and episode-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Every reset derives all of its randomness from one episode seed:
//!
//! - [`SimRng`] is seeded directly and drives episode arguments and world
//!   features.
//! - Each satellite gets its own [`SatRng`] seeded by
//!
//!   seed = episode_seed XOR (sat_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive indices uniformly across the seed space.  Adding
//! a satellite to the end of the list does not disturb the configuration of
//! the existing ones.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::SatIndex;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── SatRng ────────────────────────────────────────────────────────────────────

/// Per-satellite deterministic RNG, handed to `reset_pre_sim` so each
/// satellite resolves its configuration generator independently.
pub struct SatRng(SmallRng);

impl SatRng {
    /// Seed deterministically from the episode seed and a satellite index.
    pub fn new(episode_seed: u64, sat: SatIndex) -> Self {
        let seed = episode_seed ^ (sat.0 as u64).wrapping_mul(MIXING_CONSTANT);
        SatRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types
    /// and with [`GeneratorMap::resolve`][crate::GeneratorMap::resolve].
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Episode-level RNG for global operations (episode arguments, target
/// placement).  Used only on the controller's thread.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset, so one consumer
    /// drawing more or fewer numbers does not shift another's stream.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

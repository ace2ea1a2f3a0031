//! Deferred-evaluation configuration: generator mappings.
//!
//! A [`GeneratorMap`] maps keys to either a literal value or a sampler.  At
//! every reset the map is resolved once into an [`ArgMap`]; the resolved map
//! is then fixed for the whole episode.
//!
//! ```rust
//! use rand::{Rng, SeedableRng, rngs::SmallRng};
//! use st_core::{ArgValue, GeneratorMap};
//!
//! let generator = GeneratorMap::new()
//!     .with_fixed("sim_rate", 1.0)
//!     .with_sampled("phase", |rng| ArgValue::Float(rng.gen_range(0.0..1.0)));
//!
//! let a = generator.resolve(&mut SmallRng::seed_from_u64(7));
//! let b = generator.resolve(&mut SmallRng::seed_from_u64(7));
//! assert_eq!(a, b);
//! ```
//!
//! Samplers take the episode RNG as their only input so resolution is
//! repeatable under a fixed seed.  Keys resolve in sorted order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use crate::{SatError, SatResult};

// ── ArgValue ──────────────────────────────────────────────────────────────────

/// A resolved configuration value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ArgValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Vector(Vec<f64>),
    Text(String),
}

impl ArgValue {
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, ArgValue::None)
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            ArgValue::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<Vec<f64>> for ArgValue {
    fn from(v: Vec<f64>) -> Self {
        ArgValue::Vector(v)
    }
}

impl<const N: usize> From<[f64; N]> for ArgValue {
    fn from(v: [f64; N]) -> Self {
        ArgValue::Vector(v.to_vec())
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Text(v.to_owned())
    }
}

// ── Generator ─────────────────────────────────────────────────────────────────

/// A shared producer of one configuration value.
pub type Sampler = Arc<dyn Fn(&mut dyn RngCore) -> ArgValue + Send + Sync>;

/// One entry of a [`GeneratorMap`]: a literal, or a sampler invoked once per
/// resolution.
#[derive(Clone)]
pub enum Generator {
    Fixed(ArgValue),
    Sampled(Sampler),
}

impl Generator {
    pub fn sampled<F>(f: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> ArgValue + Send + Sync + 'static,
    {
        Generator::Sampled(Arc::new(f))
    }

    /// Produce the value for one episode.
    pub fn resolve(&self, rng: &mut dyn RngCore) -> ArgValue {
        match self {
            Generator::Fixed(value) => value.clone(),
            Generator::Sampled(sampler) => sampler(rng),
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generator::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Generator::Sampled(_) => f.write_str("Sampled(..)"),
        }
    }
}

impl From<ArgValue> for Generator {
    fn from(value: ArgValue) -> Self {
        Generator::Fixed(value)
    }
}

// ── GeneratorMap ──────────────────────────────────────────────────────────────

/// Key-ordered mapping of configuration generators.
#[derive(Clone, Debug, Default)]
pub struct GeneratorMap {
    entries: BTreeMap<String, Generator>,
}

impl GeneratorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.
    pub fn set(&mut self, key: impl Into<String>, generator: Generator) {
        self.entries.insert(key.into(), generator);
    }

    /// Builder form of [`set`](Self::set) for literal values.
    pub fn with_fixed(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(key, Generator::Fixed(value.into()));
        self
    }

    /// Builder form of [`set`](Self::set) for samplers.
    pub fn with_sampled<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> ArgValue + Send + Sync + 'static,
    {
        self.set(key, Generator::sampled(f));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Generator> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Generator)> {
        self.entries.iter().map(|(k, g)| (k.as_str(), g))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry exactly once, in key order.
    pub fn resolve(&self, rng: &mut dyn RngCore) -> ArgMap {
        let values = self
            .entries
            .iter()
            .map(|(key, generator)| (key.clone(), generator.resolve(rng)))
            .collect();
        ArgMap { values }
    }
}

// ── ArgMap ────────────────────────────────────────────────────────────────────

/// The resolved form of a [`GeneratorMap`], fixed for one episode.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ArgMap {
    values: BTreeMap<String, ArgValue>,
}

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ArgValue::as_f64)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ArgValue::as_int)
    }

    pub fn vector(&self, key: &str) -> Option<&[f64]> {
        self.get(key).and_then(ArgValue::as_vector)
    }

    /// `true` if `key` is absent or explicitly `None`.
    pub fn is_unset(&self, key: &str) -> bool {
        self.get(key).is_none_or(ArgValue::is_none)
    }

    pub fn require_float(&self, key: &str) -> SatResult<f64> {
        match self.get(key) {
            None => Err(SatError::MissingArg(key.to_owned())),
            Some(v) => v.as_f64().ok_or_else(|| SatError::BadArg {
                key:      key.to_owned(),
                expected: "a number",
            }),
        }
    }

    /// Fetch a fixed-length vector (e.g. a 3-vector position).
    pub fn require_array<const N: usize>(&self, key: &str) -> SatResult<[f64; N]> {
        let bad = || SatError::BadArg {
            key:      key.to_owned(),
            expected: "a vector of the right length",
        };
        match self.get(key) {
            None => Err(SatError::MissingArg(key.to_owned())),
            Some(v) => v
                .as_vector()
                .ok_or_else(bad)?
                .try_into()
                .map_err(|_| bad()),
        }
    }
}

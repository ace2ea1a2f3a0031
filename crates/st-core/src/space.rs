//! Action/observation spaces and the values that live in them.
//!
//! Follows Gymnasium conventions: a satellite exposes a `Discrete` or `Box`
//! space, and a multi-satellite environment composes its satellites' spaces
//! into a `Tuple` in satellite-list order.

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One satellite's action.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Single discrete choice in [0, n).
    Discrete(u64),
    /// Continuous control values.
    Continuous(Vec<f64>),
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// A satellite observation, or the ordered composition of several.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Observation {
    Vector(Vec<f64>),
    Tuple(Vec<Observation>),
}

impl Observation {
    /// Flat values of a `Vector` observation; `None` for tuples.
    pub fn as_slice(&self) -> Option<&[f64]> {
        match self {
            Self::Vector(v) => Some(v),
            Self::Tuple(_) => None,
        }
    }

    /// Components of a `Tuple` observation; `None` for vectors.
    pub fn parts(&self) -> Option<&[Observation]> {
        match self {
            Self::Tuple(parts) => Some(parts),
            Self::Vector(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Space
// ---------------------------------------------------------------------------

/// Shape and bounds of valid actions or observations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Space {
    Discrete { n: u64 },
    Box { low: Vec<f64>, high: Vec<f64> },
    Tuple(Vec<Space>),
}

impl Space {
    /// A `Box` of `dim` elements sharing the same bounds.
    pub fn uniform_box(dim: usize, low: f64, high: f64) -> Self {
        Self::Box {
            low:  vec![low; dim],
            high: vec![high; dim],
        }
    }

    /// `true` if `action` is a valid member of this (leaf) space.
    pub fn contains(&self, action: &Action) -> bool {
        match (self, action) {
            (Self::Discrete { n }, Action::Discrete(v)) => v < n,
            (Self::Box { low, high }, Action::Continuous(v)) => within(v, low, high),
            _ => false,
        }
    }

    /// `true` if `obs` has this space's structure and lies within its bounds.
    pub fn contains_observation(&self, obs: &Observation) -> bool {
        match (self, obs) {
            (Self::Box { low, high }, Observation::Vector(v)) => within(v, low, high),
            #[allow(clippy::float_cmp)]
            (Self::Discrete { n }, Observation::Vector(v)) => {
                v.len() == 1 && v[0] >= 0.0 && v[0] < *n as f64 && v[0].fract() == 0.0
            }
            (Self::Tuple(spaces), Observation::Tuple(parts)) => {
                spaces.len() == parts.len()
                    && spaces
                        .iter()
                        .zip(parts)
                        .all(|(s, p)| s.contains_observation(p))
            }
            _ => false,
        }
    }
}

fn within(values: &[f64], low: &[f64], high: &[f64]) -> bool {
    values.len() == low.len()
        && values
            .iter()
            .zip(low.iter().zip(high.iter()))
            .all(|(v, (l, h))| v >= l && v <= h)
}

//! Identifier types.
//!
//! Satellites are addressed two ways: by a human-readable [`SatelliteId`]
//! (used in info mappings and logs) and by their position in the
//! environment's satellite list, [`SatIndex`] (used for RNG seeding and
//! output rows).  Index IDs are `Copy + Ord + Hash` integer wrappers.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Position of a satellite in the environment's ordered satellite list.
    pub struct SatIndex(u32);
}

typed_id! {
    /// Index of a target placed by an environment-features generator.
    pub struct TargetId(u32);
}

// ── SatelliteId ───────────────────────────────────────────────────────────────

/// Stable, human-readable satellite name (e.g. `"Sentinel-2A"`).
///
/// Keys the per-satellite entries of the step info mapping, so it should be
/// unique within one environment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SatelliteId(String);

impl SatelliteId {
    pub fn new(name: impl Into<String>) -> Self {
        SatelliteId(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SatelliteId {
    fn from(name: &str) -> Self {
        SatelliteId(name.to_owned())
    }
}

impl From<String> for SatelliteId {
    fn from(name: String) -> Self {
        SatelliteId(name)
    }
}

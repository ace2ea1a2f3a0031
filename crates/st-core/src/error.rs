//! Framework error type.
//!
//! Every `st-*` crate returns [`SatError`].  Plug-ins (engines, data managers,
//! satellites) that fail for their own reasons wrap the cause in
//! [`SatError::External`]; the episode controller propagates it with `?` and
//! never retries.

use thiserror::Error;

use crate::SatelliteId;

/// The top-level error type shared by all `st-*` crates.
#[derive(Debug, Error)]
pub enum SatError {
    #[error("action has {got} elements but the environment has {expected} satellites")]
    ActionCountMismatch { expected: usize, got: usize },

    #[error("single-satellite environment requires exactly one satellite, got {0}")]
    SatelliteCount(usize),

    #[error("invalid action for satellite {satellite}: {reason}")]
    InvalidAction { satellite: SatelliteId, reason: String },

    #[error("environment has no simulator; call reset first")]
    NotReset,

    #[error("argument `{0}` is missing")]
    MissingArg(String),

    #[error("argument `{key}` should be {expected}")]
    BadArg { key: String, expected: &'static str },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("external component failed: {0}")]
    External(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SatError {
    /// Wrap any plug-in error as [`SatError::External`].
    pub fn external<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SatError::External(Box::new(err))
    }
}

/// Shorthand result type for all `st-*` crates.
pub type SatResult<T> = Result<T, SatError>;

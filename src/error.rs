//! Error types.
//!
//! Only construction can fail. A surface that disappears while an
//! animator is running is a normal halt, not an error, and never
//! reaches a caller.

use thiserror::Error;

use crate::types::SurfaceId;

/// Why an animator could not be constructed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnimatorError {
    /// The line set was empty.
    #[error("typing animator needs at least one line")]
    EmptyLines,

    /// The target surface is absent or already detached.
    #[error("{0} is not attached")]
    SurfaceDetached(SurfaceId),

    /// A timing value is out of range.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An interval that drives a per-character step was zero.
    #[error("`{field}` must be a positive number of milliseconds")]
    ZeroInterval { field: &'static str },

    /// The TOML document could not be parsed.
    #[error("invalid typewriter config: {0}")]
    Parse(String),

    /// The config file could not be read.
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.message().to_string())
    }
}

//! Error types for the architecture model generator.
//!
//! Generation itself cannot fail once the configuration has been validated:
//! structural scarcity (no provider for a required role, no containers, no
//! exposed roles) degrades gracefully inside each stage. The only errors the
//! core surfaces are configuration errors, raised before the random source is
//! touched, and persistence errors from the writers.

use std::path::PathBuf;
use thiserror::Error;

/// A configuration that cannot be used for generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: minimum {min} exceeds maximum {max}")]
    InvertedRange {
        key: &'static str,
        min: String,
        max: String,
    },

    #[error("{key}: value {actual} is below the allowed minimum {minimum}")]
    BelowMinimum {
        key: &'static str,
        minimum: String,
        actual: String,
    },

    #[error("{key}: value must be a finite number")]
    NotFinite { key: &'static str },

    #[error("{key}: range from {min} to {max} is too wide to sample")]
    RangeTooWide {
        key: &'static str,
        min: String,
        max: String,
    },

    #[error("{key}: magnitude of {actual} cannot be rounded to two decimals")]
    TooLarge { key: &'static str, actual: String },

    #[error("failed to load configuration from {path}: {reason}")]
    Load { path: String, reason: String },
}

impl ConfigError {
    pub(crate) fn inverted(key: &'static str, min: impl ToString, max: impl ToString) -> Self {
        Self::InvertedRange {
            key,
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub(crate) fn below(key: &'static str, minimum: impl ToString, actual: impl ToString) -> Self {
        Self::BelowMinimum {
            key,
            minimum: minimum.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Name of the configuration key at fault, when there is one.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::InvertedRange { key, .. }
            | Self::BelowMinimum { key, .. }
            | Self::NotFinite { key }
            | Self::RangeTooWide { key, .. }
            | Self::TooLarge { key, .. } => Some(key),
            Self::Load { .. } => None,
        }
    }
}

/// Failure of a generation run.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("invalid generator configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Failure while persisting a model or reading one back.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to serialize {what} as {format}: {reason}")]
    Serialize {
        what: &'static str,
        format: &'static str,
        reason: String,
    },

    #[error("failed to parse {}: {reason}", path.display())]
    Deserialize { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

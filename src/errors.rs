// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::discover::DiscoveryError;
use crate::exec::ExecutionError;
use crate::notification::TransportError;

#[derive(Error, Debug)]
pub enum TestwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TestwatchError {
    /// Whether this error should be reported as a usage error (exit code 2)
    /// rather than a runtime failure.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, TestwatchError::ConfigError(_) | TestwatchError::TomlError(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TestwatchError>;

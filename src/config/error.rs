//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Log level filter cannot be empty")]
    EmptyLogLevel,

    #[error("Variation '{field}' must be strictly between 0 and 1, got {value}")]
    InvalidVariation { field: &'static str, value: f64 },
}

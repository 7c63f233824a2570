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
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Request body limit must be at least 1 byte")]
    InvalidBodyLimit,

    #[error("Invalid CORS origin: {0:?}")]
    InvalidCorsOrigin(String),

    #[error("Consistency threshold must be in (0, 1]")]
    InvalidConsistencyThreshold,

    #[error("Eigenvector tolerance must be a positive finite number")]
    InvalidEigenTolerance,

    #[error("Eigenvector iteration cap must be at least 1")]
    InvalidMaxIterations,

    #[error("Sensitivity analysis needs at least 2 steps")]
    InvalidSensitivitySteps,

    #[error("Default simulation count must be between 1 and max_simulations")]
    InvalidSimulationCount,
}

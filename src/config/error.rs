//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid policy timeout")]
    InvalidTimeout,

    #[error("Policy base URL must be http(s)")]
    InvalidPolicyUrl,

    #[error("max_rounds must be at least 1")]
    InvalidMaxRounds,

    #[error("expiry_days must be at least 1")]
    InvalidExpiryDays,
}

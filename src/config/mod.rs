//! Application configuration.
//!
//! Type-safe configuration loading from environment variables via the
//! `config` and `dotenvy` crates. Variables carry the `HAGGLE` prefix
//! with `__` separating nested values.
//!
//! # Example
//!
//! ```no_run
//! use haggle::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod negotiation;
mod policy;

pub use error::{ConfigError, ValidationError};
pub use negotiation::NegotiationDefaults;
pub use policy::PolicyConfig;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Remote pricing policy endpoint.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Defaults for new negotiations.
    #[serde(default)]
    pub negotiation: NegotiationDefaults,
}

impl AppConfig {
    /// Loads configuration from the environment.
    ///
    /// Reads a `.env` file when present, then variables with the
    /// `HAGGLE` prefix:
    ///
    /// - `HAGGLE__POLICY__API_KEY=...` -> `policy.api_key`
    /// - `HAGGLE__NEGOTIATION__MAX_ROUNDS=5` -> `negotiation.max_rounds`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when values cannot be parsed or fail
    /// validation.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config: Self = config::Config::builder()
            .add_source(config::Environment::default().prefix("HAGGLE").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.policy.validate()?;
        self.negotiation.validate()?;
        Ok(())
    }
}

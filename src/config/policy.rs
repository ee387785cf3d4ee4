//! Pricing policy endpoint configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Remote pricing policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// API key for the generative endpoint. When absent, the engine
    /// runs on the local heuristic alone.
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Decision deadline in seconds; the fallback engages past it.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Response token cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl PolicyConfig {
    /// Returns the deadline as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns true if a remote policy is configured.
    pub fn has_remote(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validates the section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidPolicyUrl);
        }
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_tokens() -> u32 {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PolicyConfig::default().validate().is_ok());
        assert!(!PolicyConfig::default().has_remote());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = PolicyConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let config = PolicyConfig {
            base_url: "ftp://somewhere".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPolicyUrl)
        ));
    }

    #[test]
    fn empty_api_key_counts_as_absent() {
        let config = PolicyConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.has_remote());
    }
}

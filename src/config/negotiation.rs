//! Negotiation defaults applied at creation.

use serde::Deserialize;

use crate::domain::pricing::{SellerPersonality, UrgencyLevel};

use super::error::ValidationError;

/// Defaults copied onto new negotiations.
#[derive(Debug, Clone, Deserialize)]
pub struct NegotiationDefaults {
    /// Round cap unless the seller overrides it.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Days until an untouched negotiation expires.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: i64,

    /// Trailing messages condensed into the policy context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Default urgency handed to the pricing policy.
    #[serde(default)]
    pub urgency: UrgencyLevel,

    /// Default personality handed to the pricing policy.
    #[serde(default)]
    pub personality: SellerPersonality,
}

impl NegotiationDefaults {
    /// Validates the section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_rounds == 0 {
            return Err(ValidationError::InvalidMaxRounds);
        }
        if self.expiry_days < 1 {
            return Err(ValidationError::InvalidExpiryDays);
        }
        Ok(())
    }
}

impl Default for NegotiationDefaults {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            expiry_days: default_expiry_days(),
            history_window: default_history_window(),
            urgency: UrgencyLevel::default(),
            personality: SellerPersonality::default(),
        }
    }
}

fn default_max_rounds() -> u32 {
    5
}

fn default_expiry_days() -> i64 {
    7
}

fn default_history_window() -> usize {
    10
}

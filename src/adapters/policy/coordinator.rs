//! Policy coordinator - primary policy with automatic local fallback.
//!
//! Runs the primary under a deadline. Any error, timeout, or malformed
//! response engages the deterministic heuristic, so a decision always
//! comes back; callers never see a policy failure.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::adapters::policy::{RemotePolicyConfig, RemotePricingPolicy};
use crate::config::PolicyConfig;
use crate::domain::pricing::{FallbackPolicy, PolicyContext, PricingDecision};
use crate::ports::{PolicyError, PricingPolicy};

/// A decision plus how it was reached.
#[derive(Debug, Clone)]
pub struct CoordinatedDecision {
    pub decision: PricingDecision,
    /// Why the fallback engaged; `None` when the primary answered.
    pub fallback_reason: Option<String>,
}

/// Wraps a primary [`PricingPolicy`] with the local heuristic.
pub struct PolicyCoordinator {
    primary: Option<Arc<dyn PricingPolicy>>,
    fallback: FallbackPolicy,
    timeout: Duration,
}

impl PolicyCoordinator {
    /// Coordinator with a primary policy and a decision deadline.
    pub fn new(primary: Arc<dyn PricingPolicy>, timeout: Duration) -> Self {
        Self {
            primary: Some(primary),
            fallback: FallbackPolicy::new(),
            timeout,
        }
    }

    /// Coordinator that always uses the local heuristic.
    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            fallback: FallbackPolicy::new(),
            timeout: Duration::from_secs(0),
        }
    }

    /// Builds a coordinator from configuration: remote primary when an
    /// API key is present, heuristic only otherwise.
    ///
    /// # Errors
    ///
    /// - `Network` if the remote HTTP client cannot be built
    pub fn from_config(config: &PolicyConfig) -> Result<Self, PolicyError> {
        match &config.api_key {
            Some(key) if config.has_remote() => {
                let mut remote_config = RemotePolicyConfig::new(key.clone())
                    .with_model(config.model.clone())
                    .with_base_url(config.base_url.clone())
                    .with_timeout(config.timeout());
                remote_config.max_tokens = config.max_tokens;
                let remote = RemotePricingPolicy::new(remote_config)?;
                Ok(Self::new(Arc::new(remote), config.timeout()))
            }
            _ => Ok(Self::heuristic_only()),
        }
    }

    /// Decides on the context. Infallible.
    pub async fn decide(&self, ctx: &PolicyContext) -> CoordinatedDecision {
        let Some(primary) = &self.primary else {
            return CoordinatedDecision {
                decision: self.fallback.decide(ctx),
                fallback_reason: None,
            };
        };

        match tokio::time::timeout(self.timeout, primary.decide(ctx)).await {
            Ok(Ok(decision)) => CoordinatedDecision {
                decision,
                fallback_reason: None,
            },
            Ok(Err(err)) => {
                let reason = format!("{} failed: {}", primary.name(), err);
                warn!(policy = primary.name(), error = %err, "pricing policy failed, using fallback");
                CoordinatedDecision {
                    decision: self.fallback.decide(ctx),
                    fallback_reason: Some(reason),
                }
            }
            Err(_) => {
                let reason = format!(
                    "{} timed out after {}s",
                    primary.name(),
                    self.timeout.as_secs()
                );
                warn!(policy = primary.name(), timeout_secs = self.timeout.as_secs(), "pricing policy timed out, using fallback");
                CoordinatedDecision {
                    decision: self.fallback.decide(ctx),
                    fallback_reason: Some(reason),
                }
            }
        }
    }
}

//! PricingPolicy port - interface for AI pricing decisions.
//!
//! Abstracts whoever decides how the AI counterparty responds to an
//! offer, so the engine can swap a remote generative endpoint, a
//! scripted mock, or the local heuristic without changing command flow.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pricing::{PolicyContext, PricingDecision};

/// Failure modes of a pricing policy.
///
/// All of these are recoverable: the engine falls back to the local
/// heuristic rather than surfacing them to callers.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy did not answer within its deadline.
    #[error("policy timed out after {timeout_secs}s")]
    Timeout {
        /// Configured deadline.
        timeout_secs: u64,
    },

    /// The remote endpoint refused or failed the request.
    #[error("policy unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The response arrived but could not be interpreted.
    #[error("malformed policy response: {0}")]
    MalformedResponse(String),

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),
}

/// Port for AI pricing decisions.
///
/// Implementations receive a [`PolicyContext`] snapshot and return a
/// [`PricingDecision`]. They must not mutate negotiation state.
#[async_trait]
pub trait PricingPolicy: Send + Sync {
    /// Decide how to respond to the offer described by `ctx`.
    async fn decide(&self, ctx: &PolicyContext) -> Result<PricingDecision, PolicyError>;

    /// Policy name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PricingPolicy) {}

    #[test]
    fn errors_render_with_context() {
        let err = PolicyError::Timeout { timeout_secs: 10 };
        assert_eq!(err.to_string(), "policy timed out after 10s");
    }
}

//! Pricing policy adapters: remote endpoint, local fallback
//! coordination, and the scripted test double.

mod coordinator;
mod mock;
mod remote;

pub use coordinator::{CoordinatedDecision, PolicyCoordinator};
pub use mock::MockPolicy;
pub use remote::{RemotePolicyConfig, RemotePricingPolicy};

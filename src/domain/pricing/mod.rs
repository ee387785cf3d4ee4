//! Pricing domain: decision types, policy context, and the local
//! fallback heuristic. The policy port itself lives in `ports`.

pub mod context;
pub mod decision;
pub mod fallback;

pub use context::{HistoryEntry, PolicyContext, SellerPersonality, UrgencyLevel};
pub use decision::{CounterOffer, DecisionAction, PricingDecision};
pub use fallback::FallbackPolicy;

//! Analytics: derived, read-only views over negotiation timelines.

pub mod insights;
pub mod sentiment;

pub use insights::{ActivityCounts, NegotiationInsights, OfferPoint};
pub use sentiment::{Sentiment, SentimentLabel};

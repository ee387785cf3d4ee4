//! EventPublisher port - interface for publishing domain events.
//!
//! The domain publishes envelopes without knowing the transport
//! (in-memory bus, message broker, websocket fan-out).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (handlers may see duplicates)
/// - `publish_all` preserves the order events were buffered in
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish a batch of events in order.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

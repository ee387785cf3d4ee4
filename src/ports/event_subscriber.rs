//! EventSubscriber port - interface for receiving domain events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Implementations should be idempotent and quick; long work belongs in
/// a queue, not in the handler.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for registering event handlers.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe a handler to one event type (e.g. `negotiation.accepted`).
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe a handler to several event types at once.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the error taxonomy, the
//! `StateMachine` trait, and the domain event infrastructure that form
//! the vocabulary of the negotiation domain.

mod currency;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use currency::Currency;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventEnvelope, EventId, EventMetadata};
pub use ids::{MessageId, NegotiationId, ProductId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

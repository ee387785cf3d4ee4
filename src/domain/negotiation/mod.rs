//! Negotiation domain: the aggregate, its timeline, branches, and events.

pub mod aggregate;
pub mod branch;
pub mod events;
pub mod message;
pub mod pricing_terms;
pub mod status;

pub use aggregate::{Negotiation, OpenNegotiation, ParticipantRole, DEFAULT_MAX_ROUNDS};
pub use branch::{Branch, BranchKind, BranchName, MAIN_BRANCH};
pub use events::{ExpiryReason, NegotiationEvent};
pub use message::{Message, MessageBody, MessageKind, MessageQuery, MessageSender, OfferDetails};
pub use pricing_terms::{PricingTerms, OFFER_FLOOR_RATIO};
pub use status::NegotiationStatus;

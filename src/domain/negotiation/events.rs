//! Negotiation domain events.
//!
//! Events are buffered on the aggregate and drained by command handlers
//! (`take_events`), which wrap them in envelopes for the publisher. A
//! real-time transport collaborator fans them out to connected clients.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::foundation::{
    EventEnvelope, MessageId, NegotiationId, ProductId, Timestamp, UserId,
};

use super::branch::{BranchKind, BranchName};
use super::message::{MessageKind, MessageSender};

/// Why a negotiation expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    RoundLimit,
    Deadline,
}

/// Events that can occur during a negotiation's lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NegotiationEvent {
    /// A buyer opened a negotiation on a product.
    Started {
        negotiation_id: NegotiationId,
        product_id: ProductId,
        buyer_id: UserId,
        initial_offer: f64,
        occurred_at: Timestamp,
    },

    /// A message was appended to a branch.
    MessagePosted {
        negotiation_id: NegotiationId,
        message_id: MessageId,
        sender: MessageSender,
        kind: MessageKind,
        branch: BranchName,
        occurred_at: Timestamp,
    },

    /// A buyer put a new offer on the table.
    OfferSubmitted {
        negotiation_id: NegotiationId,
        amount: f64,
        round: u32,
        occurred_at: Timestamp,
    },

    /// The AI side countered with a new amount.
    Countered {
        negotiation_id: NegotiationId,
        amount: f64,
        round: u32,
        is_fallback: bool,
        occurred_at: Timestamp,
    },

    /// The deal closed at the final price.
    Accepted {
        negotiation_id: NegotiationId,
        product_id: ProductId,
        buyer_id: UserId,
        seller_id: UserId,
        final_price: f64,
        rounds: u32,
        occurred_at: Timestamp,
    },

    /// The offer was turned down for good.
    Rejected {
        negotiation_id: NegotiationId,
        reason: String,
        occurred_at: Timestamp,
    },

    /// The negotiation ran out of rounds or time.
    Expired {
        negotiation_id: NegotiationId,
        reason: ExpiryReason,
        occurred_at: Timestamp,
    },

    /// A participant walked away.
    Cancelled {
        negotiation_id: NegotiationId,
        by: UserId,
        reason: Option<String>,
        occurred_at: Timestamp,
    },

    /// An alternate-scenario branch was created.
    BranchCreated {
        negotiation_id: NegotiationId,
        name: BranchName,
        kind: BranchKind,
        parent: BranchName,
        occurred_at: Timestamp,
    },

    /// The live branch pointer moved.
    BranchSwitched {
        negotiation_id: NegotiationId,
        name: BranchName,
        occurred_at: Timestamp,
    },

    /// The pricing policy primary failed and the fallback decided.
    FallbackEngaged {
        negotiation_id: NegotiationId,
        reason: String,
        occurred_at: Timestamp,
    },
}

impl NegotiationEvent {
    /// Returns the routing string for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            NegotiationEvent::Started { .. } => "negotiation.started",
            NegotiationEvent::MessagePosted { .. } => "negotiation.message_posted",
            NegotiationEvent::OfferSubmitted { .. } => "negotiation.offer_submitted",
            NegotiationEvent::Countered { .. } => "negotiation.countered",
            NegotiationEvent::Accepted { .. } => "negotiation.accepted",
            NegotiationEvent::Rejected { .. } => "negotiation.rejected",
            NegotiationEvent::Expired { .. } => "negotiation.expired",
            NegotiationEvent::Cancelled { .. } => "negotiation.cancelled",
            NegotiationEvent::BranchCreated { .. } => "negotiation.branch_created",
            NegotiationEvent::BranchSwitched { .. } => "negotiation.branch_switched",
            NegotiationEvent::FallbackEngaged { .. } => "pricing.fallback_engaged",
        }
    }

    /// Returns the negotiation this event belongs to.
    pub fn negotiation_id(&self) -> NegotiationId {
        match self {
            NegotiationEvent::Started { negotiation_id, .. }
            | NegotiationEvent::MessagePosted { negotiation_id, .. }
            | NegotiationEvent::OfferSubmitted { negotiation_id, .. }
            | NegotiationEvent::Countered { negotiation_id, .. }
            | NegotiationEvent::Accepted { negotiation_id, .. }
            | NegotiationEvent::Rejected { negotiation_id, .. }
            | NegotiationEvent::Expired { negotiation_id, .. }
            | NegotiationEvent::Cancelled { negotiation_id, .. }
            | NegotiationEvent::BranchCreated { negotiation_id, .. }
            | NegotiationEvent::BranchSwitched { negotiation_id, .. }
            | NegotiationEvent::FallbackEngaged { negotiation_id, .. } => *negotiation_id,
        }
    }

    /// Returns when this event occurred.
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            NegotiationEvent::Started { occurred_at, .. }
            | NegotiationEvent::MessagePosted { occurred_at, .. }
            | NegotiationEvent::OfferSubmitted { occurred_at, .. }
            | NegotiationEvent::Countered { occurred_at, .. }
            | NegotiationEvent::Accepted { occurred_at, .. }
            | NegotiationEvent::Rejected { occurred_at, .. }
            | NegotiationEvent::Expired { occurred_at, .. }
            | NegotiationEvent::Cancelled { occurred_at, .. }
            | NegotiationEvent::BranchCreated { occurred_at, .. }
            | NegotiationEvent::BranchSwitched { occurred_at, .. }
            | NegotiationEvent::FallbackEngaged { occurred_at, .. } => *occurred_at,
        }
    }

    /// Wraps this event in a transport envelope.
    pub fn to_envelope(&self) -> EventEnvelope {
        let payload = serde_json::to_value(self).unwrap_or_else(|_| json!({}));
        let mut envelope = EventEnvelope::new(
            self.event_type(),
            self.negotiation_id().to_string(),
            "Negotiation",
            payload,
        );
        envelope.occurred_at = self.occurred_at();
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_stable() {
        let id = NegotiationId::new();
        let event = NegotiationEvent::Accepted {
            negotiation_id: id,
            product_id: ProductId::new(),
            buyer_id: UserId::new("buyer").unwrap(),
            seller_id: UserId::new("seller").unwrap(),
            final_price: 820.0,
            rounds: 3,
            occurred_at: Timestamp::now(),
        };
        assert_eq!(event.event_type(), "negotiation.accepted");
        assert_eq!(event.negotiation_id(), id);
    }

    #[test]
    fn envelope_carries_aggregate_and_payload() {
        let id = NegotiationId::new();
        let event = NegotiationEvent::Countered {
            negotiation_id: id,
            amount: 860.0,
            round: 2,
            is_fallback: true,
            occurred_at: Timestamp::now(),
        };
        let envelope = event.to_envelope();
        assert_eq!(envelope.event_type, "negotiation.countered");
        assert_eq!(envelope.aggregate_id, id.to_string());
        assert_eq!(envelope.aggregate_type, "Negotiation");
        assert_eq!(envelope.payload["Countered"]["amount"], 860.0);
    }

    #[test]
    fn envelope_preserves_event_time() {
        let occurred = Timestamp::now().add_days(-1);
        let event = NegotiationEvent::BranchSwitched {
            negotiation_id: NegotiationId::new(),
            name: BranchName::main(),
            occurred_at: occurred,
        };
        assert_eq!(event.to_envelope().occurred_at, occurred);
    }
}

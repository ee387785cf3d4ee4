//! Messages: the immutable, append-only units of a negotiation timeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{Currency, MessageId, Timestamp};

use super::branch::BranchName;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    Buyer,
    Seller,
    Ai,
    System,
}

/// Offer terms attached to an offer-bearing message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfferDetails {
    pub amount: f64,
    pub currency: Currency,
    /// True when the sender declared this their last offer.
    pub is_final: bool,
}

impl OfferDetails {
    /// Creates offer details for a non-final offer.
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount,
            currency,
            is_final: false,
        }
    }

    /// Marks the offer as final.
    pub fn final_offer(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// Message payload as a closed tagged union.
///
/// Offer-bearing variants carry their terms inline so application code
/// handles every shape exhaustively instead of probing an open map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody {
    Text { content: String },
    Offer { content: String, offer: OfferDetails },
    CounterOffer { content: String, offer: OfferDetails },
    Acceptance { content: String, offer: OfferDetails },
    Rejection { content: String },
    System { content: String },
}

/// Discriminant of `MessageBody`, used for filtering queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Offer,
    CounterOffer,
    Acceptance,
    Rejection,
    System,
}

/// A single timeline entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender: MessageSender,
    body: MessageBody,
    branch: BranchName,
    /// Free-form context: response time, client info, fallback flags.
    metadata: HashMap<String, String>,
    created_at: Timestamp,
}

impl Message {
    /// Creates a new message on the given branch.
    pub fn new(sender: MessageSender, body: MessageBody, branch: BranchName) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            body,
            branch,
            metadata: HashMap::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Attaches a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Reconstitutes a message from persistence.
    pub fn reconstitute(
        id: MessageId,
        sender: MessageSender,
        body: MessageBody,
        branch: BranchName,
        metadata: HashMap<String, String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            sender,
            body,
            branch,
            metadata,
            created_at,
        }
    }

    /// Returns the message ID.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the sender.
    pub fn sender(&self) -> MessageSender {
        self.sender
    }

    /// Returns the payload.
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Returns the branch this message was posted on.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Returns the metadata map.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Returns when the message was appended.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the kind discriminant of the payload.
    pub fn kind(&self) -> MessageKind {
        match self.body {
            MessageBody::Text { .. } => MessageKind::Text,
            MessageBody::Offer { .. } => MessageKind::Offer,
            MessageBody::CounterOffer { .. } => MessageKind::CounterOffer,
            MessageBody::Acceptance { .. } => MessageKind::Acceptance,
            MessageBody::Rejection { .. } => MessageKind::Rejection,
            MessageBody::System { .. } => MessageKind::System,
        }
    }

    /// Returns the human-readable content.
    pub fn content(&self) -> &str {
        match &self.body {
            MessageBody::Text { content }
            | MessageBody::Offer { content, .. }
            | MessageBody::CounterOffer { content, .. }
            | MessageBody::Acceptance { content, .. }
            | MessageBody::Rejection { content }
            | MessageBody::System { content } => content,
        }
    }

    /// Returns the attached offer terms, if any.
    pub fn offer(&self) -> Option<&OfferDetails> {
        match &self.body {
            MessageBody::Offer { offer, .. }
            | MessageBody::CounterOffer { offer, .. }
            | MessageBody::Acceptance { offer, .. } => Some(offer),
            _ => None,
        }
    }
}

/// Filtered, paginated read over a negotiation's timeline.
///
/// All filters are applied as a conjunction; results are ordered by
/// append order (equivalently `created_at` ascending).
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub limit: Option<usize>,
    pub offset: usize,
    pub sender: Option<MessageSender>,
    pub kind: Option<MessageKind>,
    pub branch: Option<BranchName>,
    pub after: Option<Timestamp>,
    pub before: Option<Timestamp>,
}

impl MessageQuery {
    /// Creates an unfiltered query over the active branch.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to a specific branch.
    pub fn on_branch(mut self, branch: BranchName) -> Self {
        self.branch = Some(branch);
        self
    }

    /// Restricts to a sender.
    pub fn from_sender(mut self, sender: MessageSender) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Restricts to a message kind.
    pub fn of_kind(mut self, kind: MessageKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to messages created at or after the given time.
    pub fn since(mut self, after: Timestamp) -> Self {
        self.after = Some(after);
        self
    }

    /// Restricts to messages created before the given time.
    pub fn until(mut self, before: Timestamp) -> Self {
        self.before = Some(before);
        self
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the page offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns true if the message passes the sender/kind/date filters.
    ///
    /// Branch visibility is resolved by the aggregate, not here.
    pub fn matches(&self, message: &Message) -> bool {
        if let Some(sender) = self.sender {
            if message.sender() != sender {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if message.kind() != kind {
                return false;
            }
        }
        if let Some(after) = &self.after {
            if message.created_at().is_before(after) {
                return false;
            }
        }
        if let Some(before) = &self.before {
            if !message.created_at().is_before(before) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(sender: MessageSender, content: &str) -> Message {
        Message::new(
            sender,
            MessageBody::Text {
                content: content.to_string(),
            },
            BranchName::main(),
        )
    }

    #[test]
    fn kind_matches_body_variant() {
        let msg = Message::new(
            MessageSender::Buyer,
            MessageBody::Offer {
                content: "How about 800?".to_string(),
                offer: OfferDetails::new(800.0, Currency::Usd),
            },
            BranchName::main(),
        );
        assert_eq!(msg.kind(), MessageKind::Offer);
        assert_eq!(msg.offer().unwrap().amount, 800.0);
    }

    #[test]
    fn rejection_carries_no_offer() {
        let msg = Message::new(
            MessageSender::Ai,
            MessageBody::Rejection {
                content: "Too low.".to_string(),
            },
            BranchName::main(),
        );
        assert!(msg.offer().is_none());
    }

    #[test]
    fn metadata_builder_accumulates() {
        let msg = text(MessageSender::Buyer, "hi")
            .with_metadata("client", "ios")
            .with_metadata("fallback", "true");
        assert_eq!(msg.metadata().len(), 2);
        assert_eq!(msg.metadata().get("client"), Some(&"ios".to_string()));
    }

    #[test]
    fn body_serializes_with_type_tag() {
        let body = MessageBody::CounterOffer {
            content: "I can do 850".to_string(),
            offer: OfferDetails::new(850.0, Currency::Usd),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "counter_offer");
        assert_eq!(json["offer"]["amount"], 850.0);
    }

    #[test]
    fn query_filters_are_conjunctive() {
        let query = MessageQuery::all()
            .from_sender(MessageSender::Buyer)
            .of_kind(MessageKind::Text);

        assert!(query.matches(&text(MessageSender::Buyer, "hello")));
        assert!(!query.matches(&text(MessageSender::Ai, "hello")));

        let offer = Message::new(
            MessageSender::Buyer,
            MessageBody::Offer {
                content: "800?".to_string(),
                offer: OfferDetails::new(800.0, Currency::Usd),
            },
            BranchName::main(),
        );
        assert!(!query.matches(&offer));
    }

    #[test]
    fn query_date_range_bounds_are_half_open() {
        let msg = text(MessageSender::Buyer, "hello");
        let created = msg.created_at();

        assert!(MessageQuery::all().since(created).matches(&msg));
        assert!(!MessageQuery::all().until(created).matches(&msg));
        assert!(MessageQuery::all()
            .until(created.add_seconds(1))
            .matches(&msg));
    }
}

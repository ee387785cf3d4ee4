//! Negotiation aggregate - the root entity for one buyer↔seller price
//! discussion over one product.
//!
//! The aggregate owns the message timeline (all branches), the branch
//! index, pricing bounds, and the round counter. Every state-mutating
//! operation validates participant permissions, the open/terminal
//! status, and the round cap before touching state, so the invariants
//! `rounds <= max_rounds` and `offer within bounds` hold at every
//! observable snapshot.
//!
//! # Ownership
//!
//! Product, buyer, and seller are referenced by ID; price bounds are
//! copied from the product at creation and frozen for the life of the
//! negotiation.

use std::collections::HashMap;

use crate::domain::foundation::{
    Currency, DomainError, ErrorCode, MessageId, NegotiationId, ProductId, StateMachine,
    Timestamp, UserId,
};
use crate::domain::pricing::{DecisionAction, PricingDecision};

use super::branch::{Branch, BranchKind, BranchName};
use super::events::{ExpiryReason, NegotiationEvent};
use super::message::{Message, MessageBody, MessageQuery, MessageSender, OfferDetails};
use super::pricing_terms::PricingTerms;
use super::status::NegotiationStatus;

/// Default cap on buyer-offer + AI-response exchanges.
pub const DEFAULT_MAX_ROUNDS: u32 = 5;

/// Which side of the table a participant sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Buyer,
    Seller,
}

impl From<ParticipantRole> for MessageSender {
    fn from(role: ParticipantRole) -> Self {
        match role {
            ParticipantRole::Buyer => MessageSender::Buyer,
            ParticipantRole::Seller => MessageSender::Seller,
        }
    }
}

/// Everything needed to open a negotiation.
///
/// Built by the start handler from the product snapshot and the buyer's
/// command; bounds here become the frozen `PricingTerms`.
#[derive(Debug, Clone)]
pub struct OpenNegotiation {
    pub product_id: ProductId,
    pub product_title: String,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub initial_offer: f64,
    pub opening_message: Option<String>,
    pub base_price: f64,
    pub min_price: f64,
    pub currency: Currency,
    pub max_rounds: u32,
    pub expires_at: Option<Timestamp>,
}

/// The Negotiation aggregate root.
#[derive(Debug, Clone)]
pub struct Negotiation {
    id: NegotiationId,
    product_id: ProductId,
    product_title: String,
    buyer_id: UserId,
    seller_id: UserId,
    status: NegotiationStatus,
    pricing: PricingTerms,
    /// Completed buyer-offer + AI-response exchanges.
    rounds: u32,
    max_rounds: u32,
    /// Full timeline across all branches, in append order.
    messages: Vec<Message>,
    branches: HashMap<BranchName, Branch>,
    active_branch: BranchName,
    /// Per-participant read pointer: count of messages seen.
    read_pointers: HashMap<UserId, usize>,
    expires_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
    last_activity_at: Timestamp,
    domain_events: Vec<NegotiationEvent>,
}

impl Negotiation {
    /// Opens a new negotiation with the buyer's initial offer.
    ///
    /// The opening offer message is appended to `main`; the status stays
    /// `Initiated` until the first reply lands.
    ///
    /// # Errors
    ///
    /// - `SelfNegotiation` if the buyer is the product's seller
    /// - `InvalidOffer` if the offer is below `min_price * 0.5` or
    ///   above `base_price`
    /// - `ValidationFailed` if the product bounds are malformed
    pub fn open(terms: OpenNegotiation) -> Result<Self, DomainError> {
        if terms.buyer_id == terms.seller_id {
            return Err(DomainError::new(
                ErrorCode::SelfNegotiation,
                "Sellers cannot negotiate on their own products",
            ));
        }

        let pricing = PricingTerms::new(
            terms.initial_offer,
            terms.base_price,
            terms.min_price,
            terms.currency,
        )?;

        if !pricing.is_within_bounds(terms.initial_offer) {
            return Err(DomainError::new(
                ErrorCode::InvalidOffer,
                "Initial offer is outside the negotiable range",
            )
            .with_detail("min", pricing.offer_floor().to_string())
            .with_detail("max", pricing.base_price().to_string())
            .with_detail("offer", terms.initial_offer.to_string()));
        }

        let id = NegotiationId::new();
        let now = Timestamp::now();
        let max_rounds = terms.max_rounds.max(1);

        let mut branches = HashMap::new();
        branches.insert(BranchName::main(), Branch::root());

        let mut negotiation = Self {
            id,
            product_id: terms.product_id,
            product_title: terms.product_title,
            buyer_id: terms.buyer_id.clone(),
            seller_id: terms.seller_id,
            status: NegotiationStatus::Initiated,
            pricing,
            rounds: 0,
            max_rounds,
            messages: Vec::new(),
            branches,
            active_branch: BranchName::main(),
            read_pointers: HashMap::new(),
            expires_at: terms.expires_at,
            created_at: now,
            updated_at: now,
            last_activity_at: now,
            domain_events: Vec::new(),
        };

        negotiation.record_event(NegotiationEvent::Started {
            negotiation_id: id,
            product_id: terms.product_id,
            buyer_id: terms.buyer_id,
            initial_offer: terms.initial_offer,
            occurred_at: now,
        });

        let content = terms
            .opening_message
            .unwrap_or_else(|| format!("Opening offer: {}", terms.initial_offer));
        negotiation.append(
            MessageSender::Buyer,
            MessageBody::Offer {
                content,
                offer: OfferDetails::new(terms.initial_offer, terms.currency),
            },
        );

        Ok(negotiation)
    }

    /// Reconstitutes a negotiation from persistence (no validation, no events).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: NegotiationId,
        product_id: ProductId,
        product_title: String,
        buyer_id: UserId,
        seller_id: UserId,
        status: NegotiationStatus,
        pricing: PricingTerms,
        rounds: u32,
        max_rounds: u32,
        messages: Vec<Message>,
        branches: HashMap<BranchName, Branch>,
        active_branch: BranchName,
        read_pointers: HashMap<UserId, usize>,
        expires_at: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
        last_activity_at: Timestamp,
    ) -> Self {
        Self {
            id,
            product_id,
            product_title,
            buyer_id,
            seller_id,
            status,
            pricing,
            rounds,
            max_rounds,
            messages,
            branches,
            active_branch,
            read_pointers,
            expires_at,
            created_at,
            updated_at,
            last_activity_at,
            domain_events: Vec::new(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> NegotiationId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_title(&self) -> &str {
        &self.product_title
    }

    pub fn buyer_id(&self) -> &UserId {
        &self.buyer_id
    }

    pub fn seller_id(&self) -> &UserId {
        &self.seller_id
    }

    pub fn status(&self) -> NegotiationStatus {
        self.status
    }

    pub fn pricing(&self) -> &PricingTerms {
        &self.pricing
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn active_branch(&self) -> &BranchName {
        &self.active_branch
    }

    pub fn branches(&self) -> &HashMap<BranchName, Branch> {
        &self.branches
    }

    /// Full timeline across all branches, in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    /// Takes accumulated domain events, clearing the internal buffer.
    pub fn take_events(&mut self) -> Vec<NegotiationEvent> {
        std::mem::take(&mut self.domain_events)
    }

    // ───────────────────────────────────────────────────────────────
    // Authorization
    // ───────────────────────────────────────────────────────────────

    /// Returns true if the user is the buyer or the seller.
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        &self.buyer_id == user_id || &self.seller_id == user_id
    }

    /// Resolves a user to their side of the table.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the user is neither buyer nor seller
    pub fn participant_role(&self, user_id: &UserId) -> Result<ParticipantRole, DomainError> {
        if user_id == &self.buyer_id {
            Ok(ParticipantRole::Buyer)
        } else if user_id == &self.seller_id {
            Ok(ParticipantRole::Seller)
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not a participant in this negotiation",
            ))
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Guards
    // ───────────────────────────────────────────────────────────────

    /// Fails with `NegotiationClosed` if the status is terminal.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.status.is_open() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::NegotiationClosed,
                format!("Negotiation is {}", self.status),
            ))
        }
    }

    /// Transitions to `Expired` if the deadline has passed.
    ///
    /// Returns true if the transition happened on this call.
    pub fn expire_if_due(&mut self, now: Timestamp) -> bool {
        if !self.status.is_open() {
            return false;
        }
        match self.expires_at {
            Some(deadline) if !now.is_before(&deadline) => {
                self.expire(ExpiryReason::Deadline);
                true
            }
            _ => false,
        }
    }

    /// Fails with `RoundLimitExceeded` once the round cap is reached.
    ///
    /// Discovery of the exhausted cap is itself the trigger: the
    /// negotiation transitions to `Expired` before the error returns,
    /// so the pricing policy is never consulted on a dead negotiation.
    pub fn enforce_round_limit(&mut self) -> Result<(), DomainError> {
        if self.rounds < self.max_rounds {
            return Ok(());
        }
        if self.status.is_open() {
            self.expire(ExpiryReason::RoundLimit);
        }
        Err(DomainError::new(
            ErrorCode::RoundLimitExceeded,
            format!("Round limit of {} reached", self.max_rounds),
        ))
    }

    fn expire(&mut self, reason: ExpiryReason) {
        if let Ok(next) = self.status.transition_to(NegotiationStatus::Expired) {
            self.status = next;
            let content = match reason {
                ExpiryReason::RoundLimit => "Negotiation expired: round limit reached",
                ExpiryReason::Deadline => "Negotiation expired: deadline passed",
            };
            self.append(
                MessageSender::System,
                MessageBody::System {
                    content: content.to_string(),
                },
            );
            self.record_event(NegotiationEvent::Expired {
                negotiation_id: self.id,
                reason,
                occurred_at: Timestamp::now(),
            });
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Participant operations
    // ───────────────────────────────────────────────────────────────

    /// Appends a text message from a participant to the active branch.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor is not a participant
    /// - `NegotiationClosed` if the status is terminal
    /// - `RoundLimitExceeded` if the round cap is exhausted (the
    ///   negotiation transitions to `Expired` as a side effect)
    /// - `ValidationFailed` if the content is empty
    pub fn post_message(
        &mut self,
        actor_id: &UserId,
        content: impl Into<String>,
    ) -> Result<(ParticipantRole, MessageId), DomainError> {
        let role = self.participant_role(actor_id)?;
        self.expire_if_due(Timestamp::now());
        self.ensure_open()?;
        self.enforce_round_limit()?;

        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::validation(
                "content",
                "Message content cannot be empty",
            ));
        }

        let message_id = self.append(role.into(), MessageBody::Text { content });
        Ok((role, message_id))
    }

    /// Puts a new offer on the table for a participant.
    ///
    /// The round counter does not move here; a round completes only
    /// when the AI side answers (see [`apply_decision`]).
    ///
    /// # Errors
    ///
    /// As [`post_message`], plus `OfferOutOfRange` if the amount is
    /// outside `[min_price * 0.5, base_price]`.
    ///
    /// [`apply_decision`]: Negotiation::apply_decision
    /// [`post_message`]: Negotiation::post_message
    pub fn submit_offer(
        &mut self,
        actor_id: &UserId,
        amount: f64,
        note: Option<String>,
    ) -> Result<(ParticipantRole, MessageId), DomainError> {
        let role = self.participant_role(actor_id)?;
        self.expire_if_due(Timestamp::now());
        self.ensure_open()?;
        self.enforce_round_limit()?;

        if !self.pricing.is_within_bounds(amount) {
            return Err(DomainError::new(
                ErrorCode::OfferOutOfRange,
                "Offer is outside the negotiable range",
            )
            .with_detail("min", self.pricing.offer_floor().to_string())
            .with_detail("max", self.pricing.base_price().to_string())
            .with_detail("offer", amount.to_string()));
        }

        self.pricing.record_offer(amount);
        let content = note.unwrap_or_else(|| format!("Offer: {}", amount));
        let message_id = self.append(
            role.into(),
            MessageBody::Offer {
                content,
                offer: OfferDetails::new(amount, self.pricing.currency()),
            },
        );

        self.record_event(NegotiationEvent::OfferSubmitted {
            negotiation_id: self.id,
            amount,
            round: self.rounds,
            occurred_at: Timestamp::now(),
        });

        Ok((role, message_id))
    }

    /// Cancels the negotiation on behalf of a participant.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor is not a participant
    /// - `NegotiationClosed` if already terminal
    pub fn cancel(&mut self, actor_id: &UserId, reason: Option<String>) -> Result<(), DomainError> {
        self.participant_role(actor_id)?;
        self.ensure_open()?;

        self.status = self.status.transition_to(NegotiationStatus::Cancelled)?;
        let content = match &reason {
            Some(r) => format!("Negotiation cancelled: {}", r),
            None => "Negotiation cancelled".to_string(),
        };
        self.append(MessageSender::System, MessageBody::System { content });
        self.record_event(NegotiationEvent::Cancelled {
            negotiation_id: self.id,
            by: actor_id.clone(),
            reason,
            occurred_at: Timestamp::now(),
        });
        Ok(())
    }

    /// Adjusts the round cap. Seller only.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor is not the seller
    /// - `NegotiationClosed` if terminal
    /// - `ValidationFailed` if the new cap is below completed rounds
    pub fn set_max_rounds(&mut self, actor_id: &UserId, max_rounds: u32) -> Result<(), DomainError> {
        if self.participant_role(actor_id)? != ParticipantRole::Seller {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the seller can change the round limit",
            ));
        }
        self.ensure_open()?;
        if max_rounds < 1 || max_rounds < self.rounds {
            return Err(DomainError::validation(
                "max_rounds",
                "Round limit must be at least 1 and not below completed rounds",
            ));
        }
        self.max_rounds = max_rounds;
        self.touch();
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // AI-side decision application
    // ───────────────────────────────────────────────────────────────

    /// Applies a pricing decision as the AI counterparty's reply.
    ///
    /// `concludes_round` is true when the decision answers a buyer
    /// offer: the exchange counts against `max_rounds`.
    ///
    /// # Errors
    ///
    /// - `NegotiationClosed` if the status is terminal
    pub fn apply_decision(
        &mut self,
        decision: &PricingDecision,
        concludes_round: bool,
    ) -> Result<MessageId, DomainError> {
        self.ensure_open()?;

        // A decision on the opening offer is itself the first
        // non-creation message; leave Initiated before any terminal
        // transition below.
        if self.status == NegotiationStatus::Initiated {
            self.status = self.status.transition_to(NegotiationStatus::InProgress)?;
        }

        if concludes_round {
            self.rounds += 1;
        }

        let currency = self.pricing.currency();
        let content = decision.reply_text();
        let message_id = match decision.action {
            DecisionAction::Accept => {
                let final_price = self.pricing.current_offer();
                self.status = self.status.transition_to(NegotiationStatus::Accepted)?;
                let id = self.append_decision_message(
                    decision,
                    MessageBody::Acceptance {
                        content,
                        offer: OfferDetails::new(final_price, currency).final_offer(),
                    },
                );
                self.record_event(NegotiationEvent::Accepted {
                    negotiation_id: self.id,
                    product_id: self.product_id,
                    buyer_id: self.buyer_id.clone(),
                    seller_id: self.seller_id.clone(),
                    final_price,
                    rounds: self.rounds,
                    occurred_at: Timestamp::now(),
                });
                id
            }
            DecisionAction::Reject => {
                self.status = self.status.transition_to(NegotiationStatus::Rejected)?;
                let id = self
                    .append_decision_message(decision, MessageBody::Rejection { content: content.clone() });
                self.record_event(NegotiationEvent::Rejected {
                    negotiation_id: self.id,
                    reason: content,
                    occurred_at: Timestamp::now(),
                });
                id
            }
            DecisionAction::Counter => {
                let proposed = decision
                    .counter_amount()
                    .unwrap_or_else(|| self.pricing.current_offer());
                let amount = self.pricing.clamp_counter(proposed);
                self.pricing.record_offer(amount);
                let is_final = decision.is_final_counter();
                let mut offer = OfferDetails::new(amount, currency);
                if is_final {
                    offer = offer.final_offer();
                }
                let id = self
                    .append_decision_message(decision, MessageBody::CounterOffer { content, offer });
                self.record_event(NegotiationEvent::Countered {
                    negotiation_id: self.id,
                    amount,
                    round: self.rounds,
                    is_fallback: decision.is_fallback,
                    occurred_at: Timestamp::now(),
                });
                id
            }
            DecisionAction::Continue => {
                self.append_decision_message(decision, MessageBody::Text { content })
            }
        };

        Ok(message_id)
    }

    /// Notes that the fallback heuristic decided instead of the primary.
    pub fn record_fallback(&mut self, reason: impl Into<String>) {
        self.record_event(NegotiationEvent::FallbackEngaged {
            negotiation_id: self.id,
            reason: reason.into(),
            occurred_at: Timestamp::now(),
        });
    }

    fn append_decision_message(
        &mut self,
        decision: &PricingDecision,
        body: MessageBody,
    ) -> MessageId {
        let message = Message::new(MessageSender::Ai, body, self.active_branch.clone())
            .with_metadata("confidence", format!("{:.2}", decision.confidence))
            .with_metadata("fallback", decision.is_fallback.to_string());
        self.push(message)
    }

    // ───────────────────────────────────────────────────────────────
    // Branch operations
    // ───────────────────────────────────────────────────────────────

    /// Creates a named branch off `parent` at the current fork point.
    ///
    /// No messages are copied; the branch inherits the parent's history
    /// up to the fork point through shared storage.
    ///
    /// # Errors
    ///
    /// - `NegotiationClosed` if terminal
    /// - `DuplicateBranch` if the name already exists
    /// - `UnknownBranch` if the parent does not exist
    pub fn create_branch(
        &mut self,
        name: BranchName,
        kind: BranchKind,
        parent: BranchName,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        if self.branches.contains_key(&name) {
            return Err(DomainError::new(
                ErrorCode::DuplicateBranch,
                format!("Branch '{}' already exists", name),
            ));
        }
        if !self.branches.contains_key(&parent) {
            return Err(DomainError::new(
                ErrorCode::UnknownBranch,
                format!("Parent branch '{}' does not exist", parent),
            ));
        }

        let fork_point = self.messages.len();
        self.branches
            .insert(name.clone(), Branch::fork(parent.clone(), kind, fork_point));
        self.touch();
        self.record_event(NegotiationEvent::BranchCreated {
            negotiation_id: self.id,
            name,
            kind,
            parent,
            occurred_at: Timestamp::now(),
        });
        Ok(())
    }

    /// Moves the live branch pointer. Never deletes messages.
    ///
    /// # Errors
    ///
    /// - `NegotiationClosed` if terminal
    /// - `UnknownBranch` if the branch was never created
    pub fn switch_branch(&mut self, name: BranchName) -> Result<(), DomainError> {
        self.ensure_open()?;
        if !self.branches.contains_key(&name) {
            return Err(DomainError::new(
                ErrorCode::UnknownBranch,
                format!("Branch '{}' does not exist", name),
            ));
        }
        self.active_branch = name.clone();
        self.touch();
        self.record_event(NegotiationEvent::BranchSwitched {
            negotiation_id: self.id,
            name,
            occurred_at: Timestamp::now(),
        });
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Timeline reads
    // ───────────────────────────────────────────────────────────────

    /// Returns the messages visible on a branch, in append order.
    ///
    /// A branch sees its own messages plus the parent chain's history
    /// up to each fork point. Messages appended to sibling branches are
    /// never visible.
    ///
    /// # Errors
    ///
    /// - `UnknownBranch` if the branch does not exist
    pub fn visible_messages(&self, branch: &BranchName) -> Result<Vec<&Message>, DomainError> {
        let mut indexed = self.visible_indexed(branch)?;
        indexed.sort_by_key(|(i, _)| *i);
        Ok(indexed.into_iter().map(|(_, m)| m).collect())
    }

    fn visible_indexed(&self, branch: &BranchName) -> Result<Vec<(usize, &Message)>, DomainError> {
        let descriptor = self.branches.get(branch).ok_or_else(|| {
            DomainError::new(
                ErrorCode::UnknownBranch,
                format!("Branch '{}' does not exist", branch),
            )
        })?;

        let mut visible = match &descriptor.parent {
            Some(parent) => self
                .visible_indexed(parent)?
                .into_iter()
                .filter(|(i, _)| *i < descriptor.fork_point)
                .collect(),
            None => Vec::new(),
        };

        visible.extend(
            self.messages
                .iter()
                .enumerate()
                .filter(|(_, m)| m.branch() == branch),
        );
        Ok(visible)
    }

    /// Runs a filtered, paginated query over the timeline.
    ///
    /// Defaults to the active branch when the query names none.
    pub fn query_messages(&self, query: &MessageQuery) -> Result<Vec<&Message>, DomainError> {
        let branch = query.branch.clone().unwrap_or_else(|| self.active_branch.clone());
        let visible = self.visible_messages(&branch)?;
        let filtered = visible.into_iter().filter(|m| query.matches(m));

        let page: Vec<&Message> = match query.limit {
            Some(limit) => filtered.skip(query.offset).take(limit).collect(),
            None => filtered.skip(query.offset).collect(),
        };
        Ok(page)
    }

    /// Returns the last message visible on the active branch.
    pub fn last_message(&self) -> Option<&Message> {
        self.visible_messages(&self.active_branch)
            .ok()
            .and_then(|msgs| msgs.last().copied())
    }

    /// Advances a participant's read pointer to the current timeline
    /// length. Never moves backward; idempotent.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the user is not a participant
    pub fn mark_read(&mut self, user_id: &UserId) -> Result<usize, DomainError> {
        self.participant_role(user_id)?;
        let pointer = self.read_pointers.entry(user_id.clone()).or_insert(0);
        *pointer = (*pointer).max(self.messages.len());
        Ok(*pointer)
    }

    /// Returns the count of messages the user has not yet seen.
    pub fn unread_count(&self, user_id: &UserId) -> usize {
        let seen = self.read_pointers.get(user_id).copied().unwrap_or(0);
        self.messages.len().saturating_sub(seen)
    }

    /// Seconds since the last message or offer landed.
    pub fn seconds_since_last_activity(&self) -> i64 {
        self.last_activity_at.seconds_until_now()
    }

    // ───────────────────────────────────────────────────────────────
    // Internal helpers
    // ───────────────────────────────────────────────────────────────

    fn append(&mut self, sender: MessageSender, body: MessageBody) -> MessageId {
        let message = Message::new(sender, body, self.active_branch.clone());
        self.push(message)
    }

    fn push(&mut self, message: Message) -> MessageId {
        let id = message.id();
        let sender = message.sender();
        let kind = message.kind();
        let branch = message.branch().clone();
        self.messages.push(message);

        // First non-creation message moves Initiated -> InProgress.
        if self.status == NegotiationStatus::Initiated && self.messages.len() > 1 {
            self.status = NegotiationStatus::InProgress;
        }

        self.last_activity_at = Timestamp::now();
        self.touch();
        self.record_event(NegotiationEvent::MessagePosted {
            negotiation_id: self.id,
            message_id: id,
            sender,
            kind,
            branch,
            occurred_at: Timestamp::now(),
        });
        id
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }

    fn record_event(&mut self, event: NegotiationEvent) {
        self.domain_events.push(event);
    }
}

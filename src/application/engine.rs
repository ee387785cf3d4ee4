//! NegotiationEngine - command surface for the negotiation lifecycle.
//!
//! One struct owns the injected ports and a per-negotiation lock map,
//! so each command runs load -> mutate -> persist -> publish as a unit.
//! The pricing decision happens under the same lock: its deadline is
//! bounded by the policy coordinator, and holding the lock means the
//! AI always answers the offer it was actually shown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::policy::PolicyCoordinator;
use crate::config::NegotiationDefaults;
use crate::domain::foundation::{
    DomainError, ErrorCode, NegotiationId, ProductId, Timestamp, UserId,
};
use crate::domain::negotiation::{
    BranchKind, BranchName, Message, MessageQuery, Negotiation, NegotiationStatus,
    OpenNegotiation, ParticipantRole,
};
use crate::domain::pricing::PolicyContext;
use crate::ports::{
    EventPublisher, NegotiationRepository, ProductService, SaleRecord, StatsService,
};

/// Command to open a negotiation.
#[derive(Debug, Clone)]
pub struct StartNegotiationCommand {
    pub product_id: ProductId,
    pub buyer_id: UserId,
    pub initial_offer: f64,
    pub message: Option<String>,
}

/// Command to post a text message.
#[derive(Debug, Clone)]
pub struct PostMessageCommand {
    pub negotiation_id: NegotiationId,
    pub actor_id: UserId,
    pub content: String,
}

/// Command to put a new offer on the table.
#[derive(Debug, Clone)]
pub struct SubmitOfferCommand {
    pub negotiation_id: NegotiationId,
    pub actor_id: UserId,
    pub amount: f64,
    pub note: Option<String>,
}

/// Command to create a conversation branch.
#[derive(Debug, Clone)]
pub struct CreateBranchCommand {
    pub negotiation_id: NegotiationId,
    pub actor_id: UserId,
    pub name: BranchName,
    pub kind: BranchKind,
    pub parent: BranchName,
}

/// Engine wiring the domain to its collaborators.
pub struct NegotiationEngine {
    repository: Arc<dyn NegotiationRepository>,
    products: Arc<dyn ProductService>,
    stats: Arc<dyn StatsService>,
    publisher: Arc<dyn EventPublisher>,
    policy: Arc<PolicyCoordinator>,
    defaults: NegotiationDefaults,
    locks: Mutex<HashMap<NegotiationId, Arc<tokio::sync::Mutex<()>>>>,
}

impl NegotiationEngine {
    pub fn new(
        repository: Arc<dyn NegotiationRepository>,
        products: Arc<dyn ProductService>,
        stats: Arc<dyn StatsService>,
        publisher: Arc<dyn EventPublisher>,
        policy: Arc<PolicyCoordinator>,
        defaults: NegotiationDefaults,
    ) -> Self {
        Self {
            repository,
            products,
            stats,
            publisher,
            policy,
            defaults,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a negotiation on a product.
    ///
    /// # Errors
    ///
    /// - `ProductNotFound` / `ProductUnavailable` from the catalog
    /// - `SelfNegotiation` if the buyer owns the listing
    /// - `DuplicateNegotiation` if the buyer already has one open on it
    /// - `InvalidOffer` if the opening offer is out of range
    pub async fn start(
        &self,
        cmd: StartNegotiationCommand,
    ) -> Result<Negotiation, DomainError> {
        let product = self.products.get_product(cmd.product_id).await?;
        if !product.available {
            return Err(DomainError::new(
                ErrorCode::ProductUnavailable,
                "Product is no longer available",
            ));
        }

        if self
            .repository
            .find_open_by_product_and_buyer(cmd.product_id, &cmd.buyer_id)
            .await?
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateNegotiation,
                "An open negotiation already exists for this product",
            ));
        }

        let opening_message = cmd.message.clone();
        let mut negotiation = Negotiation::open(OpenNegotiation {
            product_id: product.id,
            product_title: product.title,
            seller_id: product.seller_id,
            buyer_id: cmd.buyer_id,
            initial_offer: cmd.initial_offer,
            opening_message: cmd.message,
            base_price: product.base_price,
            min_price: product.min_price,
            currency: product.currency,
            max_rounds: self.defaults.max_rounds,
            expires_at: Some(Timestamp::now().add_days(self.defaults.expiry_days)),
        })?;

        self.repository.save(&negotiation).await?;

        // The AI answers the opening offer right away; that first reply
        // does not consume a round.
        match self.respond(&mut negotiation, opening_message, false).await {
            Ok(()) => {
                self.finalize(&mut negotiation).await?;
                info!(negotiation_id = %negotiation.id(), offer = cmd.initial_offer, "negotiation started");
                Ok(negotiation)
            }
            Err(err) => {
                self.finalize(&mut negotiation).await?;
                Err(err)
            }
        }
    }

    /// Posts a participant message; buyer messages draw an AI reply
    /// without consuming a round.
    pub async fn post_message(
        &self,
        cmd: PostMessageCommand,
    ) -> Result<Negotiation, DomainError> {
        let guard = self.lock_for(cmd.negotiation_id);
        let _held = guard.lock().await;

        let mut negotiation = self.load(cmd.negotiation_id).await?;
        match negotiation.post_message(&cmd.actor_id, cmd.content.clone()) {
            Ok((ParticipantRole::Buyer, _)) => {
                self.respond(&mut negotiation, Some(cmd.content), false)
                    .await?;
                self.finalize(&mut negotiation).await?;
                Ok(negotiation)
            }
            Ok(_) => {
                self.finalize(&mut negotiation).await?;
                Ok(negotiation)
            }
            Err(err) => {
                // Round-limit or deadline discovery may have expired the
                // negotiation; that state change still has to land.
                self.finalize(&mut negotiation).await?;
                Err(err)
            }
        }
    }

    /// Submits an offer; buyer offers draw an AI decision that
    /// concludes the round.
    pub async fn submit_offer(
        &self,
        cmd: SubmitOfferCommand,
    ) -> Result<Negotiation, DomainError> {
        let guard = self.lock_for(cmd.negotiation_id);
        let _held = guard.lock().await;

        let mut negotiation = self.load(cmd.negotiation_id).await?;
        match negotiation.submit_offer(&cmd.actor_id, cmd.amount, cmd.note) {
            Ok((ParticipantRole::Buyer, _)) => {
                self.respond(&mut negotiation, None, true).await?;
                self.finalize(&mut negotiation).await?;
                Ok(negotiation)
            }
            Ok(_) => {
                self.finalize(&mut negotiation).await?;
                Ok(negotiation)
            }
            Err(err) => {
                self.finalize(&mut negotiation).await?;
                Err(err)
            }
        }
    }

    /// Cancels a negotiation on behalf of a participant.
    pub async fn cancel(
        &self,
        negotiation_id: NegotiationId,
        actor_id: &UserId,
        reason: Option<String>,
    ) -> Result<Negotiation, DomainError> {
        let guard = self.lock_for(negotiation_id);
        let _held = guard.lock().await;

        let mut negotiation = self.load(negotiation_id).await?;
        negotiation.cancel(actor_id, reason)?;
        self.finalize(&mut negotiation).await?;
        Ok(negotiation)
    }

    /// Adjusts the round cap (seller only).
    pub async fn set_max_rounds(
        &self,
        negotiation_id: NegotiationId,
        actor_id: &UserId,
        max_rounds: u32,
    ) -> Result<Negotiation, DomainError> {
        let guard = self.lock_for(negotiation_id);
        let _held = guard.lock().await;

        let mut negotiation = self.load(negotiation_id).await?;
        negotiation.set_max_rounds(actor_id, max_rounds)?;
        self.finalize(&mut negotiation).await?;
        Ok(negotiation)
    }

    /// Creates a conversation branch.
    pub async fn create_branch(
        &self,
        cmd: CreateBranchCommand,
    ) -> Result<Negotiation, DomainError> {
        let guard = self.lock_for(cmd.negotiation_id);
        let _held = guard.lock().await;

        let mut negotiation = self.load(cmd.negotiation_id).await?;
        self.ensure_participant(&negotiation, &cmd.actor_id)?;
        negotiation.create_branch(cmd.name, cmd.kind, cmd.parent)?;
        self.finalize(&mut negotiation).await?;
        Ok(negotiation)
    }

    /// Moves the live branch pointer.
    pub async fn switch_branch(
        &self,
        negotiation_id: NegotiationId,
        actor_id: &UserId,
        name: BranchName,
    ) -> Result<Negotiation, DomainError> {
        let guard = self.lock_for(negotiation_id);
        let _held = guard.lock().await;

        let mut negotiation = self.load(negotiation_id).await?;
        self.ensure_participant(&negotiation, actor_id)?;
        negotiation.switch_branch(name)?;
        self.finalize(&mut negotiation).await?;
        Ok(negotiation)
    }

    /// Advances the caller's read pointer; returns the unread count
    /// before the call.
    pub async fn mark_read(
        &self,
        negotiation_id: NegotiationId,
        actor_id: &UserId,
    ) -> Result<usize, DomainError> {
        let guard = self.lock_for(negotiation_id);
        let _held = guard.lock().await;

        let mut negotiation = self.load(negotiation_id).await?;
        let unread = negotiation.unread_count(actor_id);
        negotiation.mark_read(actor_id)?;
        self.repository.update(&negotiation).await?;
        Ok(unread)
    }

    /// Returns a consistent snapshot of a negotiation for a participant.
    pub async fn get(
        &self,
        negotiation_id: NegotiationId,
        actor_id: &UserId,
    ) -> Result<Negotiation, DomainError> {
        let negotiation = self.load(negotiation_id).await?;
        self.ensure_participant(&negotiation, actor_id)?;
        Ok(negotiation)
    }

    /// Runs a filtered message query for a participant.
    pub async fn query_messages(
        &self,
        negotiation_id: NegotiationId,
        actor_id: &UserId,
        query: &MessageQuery,
    ) -> Result<Vec<Message>, DomainError> {
        let negotiation = self.get(negotiation_id, actor_id).await?;
        let messages = negotiation.query_messages(query)?;
        Ok(messages.into_iter().cloned().collect())
    }

    // === Internals ===

    /// Asks the policy for a decision and applies it.
    async fn respond(
        &self,
        negotiation: &mut Negotiation,
        user_message: Option<String>,
        concludes_round: bool,
    ) -> Result<(), DomainError> {
        let ctx = PolicyContext::from_negotiation(
            negotiation,
            self.defaults.urgency,
            self.defaults.personality,
            self.defaults.history_window,
            user_message,
        );
        let outcome = self.policy.decide(&ctx).await;
        if let Some(reason) = outcome.fallback_reason {
            negotiation.record_fallback(reason);
        }
        negotiation.apply_decision(&outcome.decision, concludes_round)?;

        if negotiation.status() == NegotiationStatus::Accepted {
            self.settle(negotiation).await;
        }
        Ok(())
    }

    /// Acceptance side effects: mark the product sold, record the sale.
    ///
    /// The deal is already closed at this point, so collaborator
    /// failures are logged rather than surfaced.
    async fn settle(&self, negotiation: &Negotiation) {
        if let Err(err) = self.products.mark_sold(negotiation.product_id()).await {
            warn!(negotiation_id = %negotiation.id(), error = %err, "failed to mark product sold");
        }
        let sale = SaleRecord {
            seller_id: negotiation.seller_id().clone(),
            buyer_id: negotiation.buyer_id().clone(),
            final_price: negotiation.pricing().current_offer(),
            rounds: negotiation.rounds(),
        };
        if let Err(err) = self.stats.record_sale(sale).await {
            warn!(negotiation_id = %negotiation.id(), error = %err, "failed to record sale");
        }
    }

    async fn finalize(&self, negotiation: &mut Negotiation) -> Result<(), DomainError> {
        self.repository.update(negotiation).await?;
        self.publish_events(negotiation).await?;
        // Terminal negotiations take no further mutations; their lock
        // entry would otherwise live for the engine's lifetime.
        if !negotiation.status().is_open() {
            self.release_lock(negotiation.id());
        }
        Ok(())
    }

    fn release_lock(&self, id: NegotiationId) {
        let mut locks = self
            .locks
            .lock()
            .expect("NegotiationEngine: lock map poisoned");
        locks.remove(&id);
    }

    async fn publish_events(&self, negotiation: &mut Negotiation) -> Result<(), DomainError> {
        let envelopes = negotiation
            .take_events()
            .into_iter()
            .map(|e| e.to_envelope())
            .collect();
        self.publisher.publish_all(envelopes).await
    }

    async fn load(&self, id: NegotiationId) -> Result<Negotiation, DomainError> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::NegotiationNotFound,
                format!("Negotiation {} not found", id),
            )
        })
    }

    fn ensure_participant(
        &self,
        negotiation: &Negotiation,
        user_id: &UserId,
    ) -> Result<(), DomainError> {
        if negotiation.is_participant(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not a participant in this negotiation",
            ))
        }
    }

    fn lock_for(&self, id: NegotiationId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .expect("NegotiationEngine: lock map poisoned");
        locks.entry(id).or_default().clone()
    }
}

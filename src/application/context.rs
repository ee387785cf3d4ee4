//! Context switching and resume.
//!
//! Users juggle several negotiations at once; this coordinator tracks
//! which one each user is focused on and rebuilds the picture when they
//! come back to one.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, NegotiationId, UserId};
use crate::domain::negotiation::{MessageSender, NegotiationStatus};
use crate::ports::NegotiationRepository;

/// Everything needed to pick a negotiation back up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub negotiation_id: NegotiationId,
    pub product_title: String,
    pub status: NegotiationStatus,
    /// Last message on the active branch, if any.
    pub last_message: Option<ResumeMessage>,
    pub current_offer: f64,
    pub round: u32,
    pub max_rounds: u32,
    /// Seconds since the last message or offer landed.
    pub seconds_since_activity: i64,
    pub unread_count: usize,
}

/// Condensed view of the last message for resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeMessage {
    pub sender: MessageSender,
    pub content: String,
}

/// Tracks each user's active negotiation and builds resume summaries.
pub struct ContextCoordinator {
    repository: Arc<dyn NegotiationRepository>,
    active: RwLock<HashMap<UserId, NegotiationId>>,
}

impl ContextCoordinator {
    pub fn new(repository: Arc<dyn NegotiationRepository>) -> Self {
        Self {
            repository,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the negotiation the user is currently focused on.
    pub fn active_negotiation(&self, user_id: &UserId) -> Option<NegotiationId> {
        self.active
            .read()
            .expect("ContextCoordinator: active lock poisoned")
            .get(user_id)
            .copied()
    }

    /// Moves the user's focus to another negotiation.
    ///
    /// # Errors
    ///
    /// - `NegotiationNotFound` if the target does not exist
    /// - `Forbidden` if the user is not a participant in it
    pub async fn switch_context(
        &self,
        user_id: &UserId,
        target: NegotiationId,
    ) -> Result<ResumeSummary, DomainError> {
        let summary = self.resume(user_id, target).await?;
        self.active
            .write()
            .expect("ContextCoordinator: active lock poisoned")
            .insert(user_id.clone(), target);
        Ok(summary)
    }

    /// Rebuilds the picture of a negotiation for a returning user.
    ///
    /// # Errors
    ///
    /// - `NegotiationNotFound` if it does not exist
    /// - `Forbidden` if the user is not a participant
    /// - `NegotiationClosed` if the negotiation is terminal
    pub async fn resume(
        &self,
        user_id: &UserId,
        negotiation_id: NegotiationId,
    ) -> Result<ResumeSummary, DomainError> {
        let negotiation = self
            .repository
            .find_by_id(negotiation_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::NegotiationNotFound,
                    format!("Negotiation {} not found", negotiation_id),
                )
            })?;

        if !negotiation.is_participant(user_id) {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not a participant in this negotiation",
            ));
        }
        negotiation.ensure_open()?;

        let last_message = negotiation.last_message().map(|m| ResumeMessage {
            sender: m.sender(),
            content: m.content().to_string(),
        });

        Ok(ResumeSummary {
            negotiation_id,
            product_title: negotiation.product_title().to_string(),
            status: negotiation.status(),
            last_message,
            current_offer: negotiation.pricing().current_offer(),
            round: negotiation.rounds(),
            max_rounds: negotiation.max_rounds(),
            seconds_since_activity: negotiation.seconds_since_last_activity(),
            unread_count: negotiation.unread_count(user_id),
        })
    }
}

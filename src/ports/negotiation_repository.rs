//! Negotiation repository port (write side).
//!
//! Contract for persisting and retrieving Negotiation aggregates.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, NegotiationId, ProductId, UserId};
use crate::domain::negotiation::Negotiation;

/// Repository port for Negotiation aggregate persistence.
#[async_trait]
pub trait NegotiationRepository: Send + Sync {
    /// Save a new negotiation.
    ///
    /// # Errors
    ///
    /// - `StorageError` on persistence failure
    async fn save(&self, negotiation: &Negotiation) -> Result<(), DomainError>;

    /// Update an existing negotiation.
    ///
    /// # Errors
    ///
    /// - `NegotiationNotFound` if it was never saved
    /// - `StorageError` on persistence failure
    async fn update(&self, negotiation: &Negotiation) -> Result<(), DomainError>;

    /// Find a negotiation by ID. Returns `None` if not found.
    async fn find_by_id(&self, id: NegotiationId) -> Result<Option<Negotiation>, DomainError>;

    /// Find an open negotiation between a buyer and a product.
    ///
    /// Used to enforce one active negotiation per (buyer, product).
    async fn find_open_by_product_and_buyer(
        &self,
        product_id: ProductId,
        buyer_id: &UserId,
    ) -> Result<Option<Negotiation>, DomainError>;

    /// Find all negotiations a user participates in, newest first.
    async fn find_by_participant(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Negotiation>, DomainError>;
}

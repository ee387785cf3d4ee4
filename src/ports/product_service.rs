//! ProductService port - the listing catalog as seen by negotiations.
//!
//! Negotiations copy pricing bounds from the product at creation and
//! mark it sold on acceptance; everything else about listings lives
//! outside this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Currency, DomainError, ProductId, UserId};

/// The slice of a listing a negotiation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub title: String,
    pub seller_id: UserId,
    pub base_price: f64,
    /// Seller's floor; never shown to buyers.
    pub min_price: f64,
    pub currency: Currency,
    pub available: bool,
}

/// Port for product catalog lookups and the sold-state side effect.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Fetch a product snapshot.
    ///
    /// # Errors
    ///
    /// - `ProductNotFound` if the listing does not exist
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, DomainError>;

    /// Mark a product as sold. Idempotent.
    async fn mark_sold(&self, id: ProductId) -> Result<(), DomainError>;
}

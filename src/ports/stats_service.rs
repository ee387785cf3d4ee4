//! StatsService port - transaction counters updated on acceptance.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// A closed deal, as reported to the stats collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub final_price: f64,
    pub rounds: u32,
}

/// Port for recording transaction statistics.
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Record a completed sale for both participants.
    async fn record_sale(&self, sale: SaleRecord) -> Result<(), DomainError>;
}

//! In-memory transaction stats collector.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{SaleRecord, StatsService};

/// Records sales in memory for tests and reporting.
pub struct InMemoryStatsService {
    sales: RwLock<Vec<SaleRecord>>,
}

impl InMemoryStatsService {
    pub fn new() -> Self {
        Self {
            sales: RwLock::new(Vec::new()),
        }
    }

    /// Returns all recorded sales.
    pub fn sales(&self) -> Vec<SaleRecord> {
        self.sales
            .read()
            .expect("InMemoryStatsService: lock poisoned")
            .clone()
    }

    /// Returns the number of sales a user took part in, either side.
    pub fn sales_for(&self, user_id: &UserId) -> usize {
        self.sales()
            .iter()
            .filter(|s| &s.seller_id == user_id || &s.buyer_id == user_id)
            .count()
    }
}

impl Default for InMemoryStatsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsService for InMemoryStatsService {
    async fn record_sale(&self, sale: SaleRecord) -> Result<(), DomainError> {
        self.sales
            .write()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "stats lock poisoned"))?
            .push(sale);
        Ok(())
    }
}

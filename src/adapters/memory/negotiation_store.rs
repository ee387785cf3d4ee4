//! In-memory negotiation repository.
//!
//! Backing store for tests and single-process deployments. Aggregates
//! are cloned on the way in and out, so readers always see a consistent
//! snapshot.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, NegotiationId, ProductId, UserId};
use crate::domain::negotiation::Negotiation;
use crate::ports::NegotiationRepository;

/// HashMap-backed implementation of [`NegotiationRepository`].
pub struct InMemoryNegotiationStore {
    negotiations: RwLock<HashMap<NegotiationId, Negotiation>>,
}

impl InMemoryNegotiationStore {
    pub fn new() -> Self {
        Self {
            negotiations: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the number of stored negotiations.
    pub fn len(&self) -> usize {
        self.negotiations
            .read()
            .expect("InMemoryNegotiationStore: lock poisoned")
            .len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNegotiationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NegotiationRepository for InMemoryNegotiationStore {
    async fn save(&self, negotiation: &Negotiation) -> Result<(), DomainError> {
        let mut store = self
            .negotiations
            .write()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "store lock poisoned"))?;
        store.insert(negotiation.id(), negotiation.clone());
        Ok(())
    }

    async fn update(&self, negotiation: &Negotiation) -> Result<(), DomainError> {
        let mut store = self
            .negotiations
            .write()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "store lock poisoned"))?;
        if !store.contains_key(&negotiation.id()) {
            return Err(DomainError::new(
                ErrorCode::NegotiationNotFound,
                format!("Negotiation {} not found", negotiation.id()),
            ));
        }
        store.insert(negotiation.id(), negotiation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: NegotiationId) -> Result<Option<Negotiation>, DomainError> {
        let store = self
            .negotiations
            .read()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "store lock poisoned"))?;
        Ok(store.get(&id).cloned())
    }

    async fn find_open_by_product_and_buyer(
        &self,
        product_id: ProductId,
        buyer_id: &UserId,
    ) -> Result<Option<Negotiation>, DomainError> {
        let store = self
            .negotiations
            .read()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "store lock poisoned"))?;
        Ok(store
            .values()
            .find(|n| {
                n.product_id() == product_id
                    && n.buyer_id() == buyer_id
                    && n.status().is_open()
            })
            .cloned())
    }

    async fn find_by_participant(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Negotiation>, DomainError> {
        let store = self
            .negotiations
            .read()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "store lock poisoned"))?;
        let mut found: Vec<Negotiation> = store
            .values()
            .filter(|n| n.is_participant(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().as_datetime().cmp(&a.created_at().as_datetime()));
        Ok(found)
    }
}

//! In-memory product catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ProductId};
use crate::ports::{ProductService, ProductSnapshot};

/// HashMap-backed implementation of [`ProductService`].
pub struct InMemoryProductService {
    products: RwLock<HashMap<ProductId, ProductSnapshot>>,
}

impl InMemoryProductService {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
        }
    }

    /// Seeds a product into the catalog.
    pub fn insert(&self, product: ProductSnapshot) {
        self.products
            .write()
            .expect("InMemoryProductService: lock poisoned")
            .insert(product.id, product);
    }
}

impl Default for InMemoryProductService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductService for InMemoryProductService {
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, DomainError> {
        let products = self
            .products
            .read()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "catalog lock poisoned"))?;
        products.get(&id).cloned().ok_or_else(|| {
            DomainError::new(ErrorCode::ProductNotFound, format!("Product {} not found", id))
        })
    }

    async fn mark_sold(&self, id: ProductId) -> Result<(), DomainError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| DomainError::new(ErrorCode::StorageError, "catalog lock poisoned"))?;
        match products.get_mut(&id) {
            Some(product) => {
                product.available = false;
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ProductNotFound,
                format!("Product {} not found", id),
            )),
        }
    }
}

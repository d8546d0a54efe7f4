//! Stock ledger trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::ProductId;

use crate::error::CheckoutError;

/// Read-only view of product inventory.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Returns the available stock for a product, or `None` when the
    /// product's stock is not tracked (treated as unlimited).
    async fn available(&self, product_id: &ProductId) -> Result<Option<u32>, CheckoutError>;
}

/// In-memory stock ledger for tests and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockLedger {
    levels: Arc<RwLock<HashMap<ProductId, u32>>>,
}

impl InMemoryStockLedger {
    /// Creates a ledger with no tracked products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tracked stock level for a product.
    pub fn set_stock(&self, product_id: impl Into<ProductId>, available: u32) {
        self.levels.write().unwrap().insert(product_id.into(), available);
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn available(&self, product_id: &ProductId) -> Result<Option<u32>, CheckoutError> {
        Ok(self.levels.read().unwrap().get(product_id).copied())
    }
}

//! Coupon directory trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{Coupon, CouponId};

use crate::error::CheckoutError;

/// Directory of coupon records, looked up by code.
#[async_trait]
pub trait CouponDirectory: Send + Sync {
    /// Finds a coupon by its code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CheckoutError>;

    /// Finds a coupon by id.
    async fn find(&self, id: CouponId) -> Result<Option<Coupon>, CheckoutError>;

    /// Persists the coupon.
    async fn save(&self, coupon: &Coupon) -> Result<(), CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryCouponState {
    coupons: HashMap<CouponId, Coupon>,
    by_code: HashMap<String, CouponId>,
}

/// In-memory coupon directory for tests and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCouponDirectory {
    state: Arc<RwLock<InMemoryCouponState>>,
}

impl InMemoryCouponDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a coupon, indexing it by code.
    pub fn insert(&self, coupon: Coupon) {
        let mut state = self.state.write().unwrap();
        state.by_code.insert(coupon.code().to_string(), coupon.id());
        state.coupons.insert(coupon.id(), coupon);
    }
}

#[async_trait]
impl CouponDirectory for InMemoryCouponDirectory {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CheckoutError> {
        let state = self.state.read().unwrap();
        Ok(state
            .by_code
            .get(code)
            .and_then(|id| state.coupons.get(id))
            .cloned())
    }

    async fn find(&self, id: CouponId) -> Result<Option<Coupon>, CheckoutError> {
        Ok(self.state.read().unwrap().coupons.get(&id).cloned())
    }

    async fn save(&self, coupon: &Coupon) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();
        state.by_code.insert(coupon.code().to_string(), coupon.id());
        state.coupons.insert(coupon.id(), coupon.clone());
        Ok(())
    }
}

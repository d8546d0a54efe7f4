//! Cart provider trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, SessionId};
use domain::Order;

use crate::error::CheckoutError;

/// Session-backed cart storage.
///
/// The provider owns the mapping from shopper sessions to their active
/// cart, and persists order state between pipeline stages: every mutating
/// stage saves before the next stage reads.
#[async_trait]
pub trait CartProvider: Send + Sync {
    /// Returns the session's active cart.
    async fn current_cart(&self, session: &SessionId) -> Result<Order, CheckoutError>;

    /// Persists the order.
    async fn save(&self, order: &Order) -> Result<(), CheckoutError>;

    /// Re-reads the order from storage, picking up any side effects of
    /// hooks that ran on save.
    async fn refresh(&self, order_id: OrderId) -> Result<Order, CheckoutError>;

    /// Drops the session's cart reference so a fresh cart is created on
    /// the next visit. The order itself survives.
    async fn forget_cart(&self, session: &SessionId) -> Result<(), CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    active: HashMap<SessionId, OrderId>,
    orders: HashMap<OrderId, Order>,
    fail_on_save: bool,
}

/// In-memory cart provider for tests and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartProvider {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh cart bound to the session, replacing any existing
    /// binding.
    pub fn create_cart(&self, session: SessionId) -> Order {
        let order = Order::new(OrderId::new());
        let mut state = self.state.write().unwrap();
        state.active.insert(session, order.id());
        state.orders.insert(order.id(), order.clone());
        order
    }

    /// Returns a stored order by id, bypassing the session mapping.
    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        self.state.read().unwrap().orders.get(&order_id).cloned()
    }

    /// Returns true if the session has an active cart.
    pub fn has_cart(&self, session: &SessionId) -> bool {
        self.state.read().unwrap().active.contains_key(session)
    }

    /// Configures the provider to fail on the next save call.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.state.write().unwrap().fail_on_save = fail;
    }
}

#[async_trait]
impl CartProvider for InMemoryCartProvider {
    async fn current_cart(&self, session: &SessionId) -> Result<Order, CheckoutError> {
        let state = self.state.read().unwrap();
        let order_id = state
            .active
            .get(session)
            .ok_or(CheckoutError::CartNotFound(*session))?;
        state
            .orders
            .get(order_id)
            .cloned()
            .ok_or(CheckoutError::OrderNotFound(*order_id))
    }

    async fn save(&self, order: &Order) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_save {
            return Err(CheckoutError::Store("cart save failed".to_string()));
        }
        state.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn refresh(&self, order_id: OrderId) -> Result<Order, CheckoutError> {
        self.state
            .read()
            .unwrap()
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(CheckoutError::OrderNotFound(order_id))
    }

    async fn forget_cart(&self, session: &SessionId) -> Result<(), CheckoutError> {
        self.state.write().unwrap().active.remove(session);
        Ok(())
    }
}

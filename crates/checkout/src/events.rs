//! Checkout lifecycle events.
//!
//! Events are dispatched to an explicit list of registered listeners.
//! Pre-checkout listeners run before any mutation and may veto the
//! attempt by returning [`CheckoutError::Prevented`]; post-checkout
//! dispatch is fire-and-forget.

use async_trait::async_trait;
use std::sync::Arc;

use domain::Order;

use crate::error::CheckoutError;
use crate::request::CheckoutRequest;

/// A checkout lifecycle event carrying the order and original request.
#[derive(Debug, Clone)]
pub enum CheckoutEvent {
    /// Emitted before any pipeline stage runs.
    PreCheckout {
        order: Order,
        request: CheckoutRequest,
    },

    /// Emitted after every post-checkout mutation has completed.
    PostCheckout {
        order: Order,
        request: CheckoutRequest,
    },
}

impl CheckoutEvent {
    /// Builds a pre-checkout event.
    pub fn pre(order: Order, request: CheckoutRequest) -> Self {
        CheckoutEvent::PreCheckout { order, request }
    }

    /// Builds a post-checkout event.
    pub fn post(order: Order, request: CheckoutRequest) -> Self {
        CheckoutEvent::PostCheckout { order, request }
    }

    /// Returns the event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutEvent::PreCheckout { .. } => "pre_checkout",
            CheckoutEvent::PostCheckout { .. } => "post_checkout",
        }
    }
}

/// A registered handler for checkout events.
#[async_trait]
pub trait CheckoutListener: Send + Sync {
    /// Handles an event. Returning [`CheckoutError::Prevented`] from a
    /// pre-checkout event blocks the attempt; any error returned for a
    /// post-checkout event is logged and dropped.
    async fn on_event(&self, event: &CheckoutEvent) -> Result<(), CheckoutError>;
}

/// Dispatches events to registered listeners in registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Arc<dyn CheckoutListener>>,
}

impl EventBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn register(&mut self, listener: Arc<dyn CheckoutListener>) {
        self.listeners.push(listener);
    }

    /// Dispatches an event, stopping at the first listener error.
    pub async fn emit(&self, event: &CheckoutEvent) -> Result<(), CheckoutError> {
        for listener in &self.listeners {
            listener.on_event(event).await?;
        }
        Ok(())
    }

    /// Dispatches an event, logging and swallowing listener errors.
    pub async fn emit_unchecked(&self, event: &CheckoutEvent) {
        for listener in &self.listeners {
            if let Err(error) = listener.on_event(event).await {
                tracing::warn!(event = event.name(), %error, "checkout listener failed");
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

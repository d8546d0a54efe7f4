//! Payment gateway abstraction and registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use domain::Order;

use crate::error::CheckoutError;
use crate::request::CheckoutRequest;
use crate::rules::{Messages, Rule, RuleSet};

/// Result of a gateway purchase call.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    /// Whether the purchase settled and the order should be marked paid.
    pub paid: bool,

    /// Gateway-side reference for the charge.
    pub reference: Option<String>,
}

/// A pluggable payment-processing strategy.
///
/// Gateways are storage-free: `purchase` reports an outcome and the
/// payment stage applies it to the order and persists.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// The name a request selects this gateway by.
    fn name(&self) -> &'static str;

    /// Validation rules for the fields this gateway needs on purchase.
    /// Every key declared here is consumed after dispatch.
    fn purchase_rules(&self) -> RuleSet;

    /// Message overrides for the purchase rules.
    fn purchase_messages(&self) -> Messages {
        Messages::new()
    }

    /// Executes the purchase against the request and order.
    async fn purchase(
        &self,
        request: &CheckoutRequest,
        order: &Order,
    ) -> Result<PurchaseOutcome, CheckoutError>;
}

/// Registry resolving gateway names to strategies.
#[derive(Default)]
pub struct GatewayRegistry {
    gateways: HashMap<&'static str, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a gateway under its own name.
    pub fn register(&mut self, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.insert(gateway.name(), gateway);
    }

    /// Resolves a gateway by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn PaymentGateway>> {
        self.gateways.get(name).cloned()
    }
}

impl std::fmt::Debug for GatewayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRegistry")
            .field("gateways", &self.gateways.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Default)]
struct DummyState {
    charges: Vec<String>,
    next_id: u32,
    decline: bool,
}

/// Offline card gateway for development and tests.
///
/// Accepts any card unless told to decline, and records each charge so
/// tests can assert whether the gateway was reached at all.
#[derive(Debug, Clone, Default)]
pub struct DummyGateway {
    state: Arc<RwLock<DummyState>>,
}

impl DummyGateway {
    /// Creates a new dummy gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline subsequent purchases.
    pub fn set_decline(&self, decline: bool) {
        self.state.write().unwrap().decline = decline;
    }

    /// Returns how many charges have settled.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }
}

#[async_trait]
impl PaymentGateway for DummyGateway {
    fn name(&self) -> &'static str {
        "dummy"
    }

    fn purchase_rules(&self) -> RuleSet {
        let mut rules = RuleSet::new();
        rules.insert("card_number".to_string(), vec![Rule::Required, Rule::Numeric]);
        rules.insert("expiry_month".to_string(), vec![Rule::Required, Rule::Numeric]);
        rules.insert("expiry_year".to_string(), vec![Rule::Required, Rule::Numeric]);
        rules.insert("cvc".to_string(), vec![Rule::Required, Rule::Numeric]);
        rules
    }

    fn purchase_messages(&self) -> Messages {
        let mut messages = Messages::new();
        messages.insert(
            "card_number".to_string(),
            "A valid card number is required.".to_string(),
        );
        messages
    }

    #[tracing::instrument(skip(self, _request, order), fields(order_id = %order.id()))]
    async fn purchase(
        &self,
        _request: &CheckoutRequest,
        order: &Order,
    ) -> Result<PurchaseOutcome, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.decline {
            return Err(CheckoutError::Gateway("Card was declined.".to_string()));
        }

        state.next_id += 1;
        let reference = format!("DUMMY-{:04}", state.next_id);
        state.charges.push(reference.clone());

        tracing::info!(%reference, "dummy gateway charge settled");

        Ok(PurchaseOutcome {
            paid: true,
            reference: Some(reference),
        })
    }
}

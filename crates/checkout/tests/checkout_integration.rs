//! Integration tests for the checkout pipeline.
//!
//! These exercise the full stage sequence against in-memory services,
//! covering the observable guarantees of a checkout attempt: zero-total
//! auto-payment, gateway requirements, stock repair, single coupon
//! redemption, consumed-key isolation, customer creation, and prevention.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use checkout::context::CheckoutContext;
use checkout::stages::{RunPostCheckout, Stage};
use checkout::{
    CartProvider, CheckoutConfig, CheckoutError, CheckoutEvent, CheckoutListener,
    CheckoutPipeline, CheckoutRequest, CheckoutServices, CouponDirectory, CustomerDirectory,
    DummyGateway, EventBus, FormRegistry, GatewayRegistry, InMemoryCartProvider,
    InMemoryCouponDirectory, InMemoryCustomerDirectory, InMemoryStockLedger,
};
use common::SessionId;
use domain::{Coupon, Discount, LineItem, Money, Order};

struct TestHarness {
    pipeline: CheckoutPipeline,
    carts: InMemoryCartProvider,
    customers: InMemoryCustomerDirectory,
    coupons: InMemoryCouponDirectory,
    stock: InMemoryStockLedger,
    gateway: DummyGateway,
    session: SessionId,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_listeners(Vec::new())
    }

    fn with_listeners(listeners: Vec<Arc<dyn CheckoutListener>>) -> Self {
        let carts = InMemoryCartProvider::new();
        let customers = InMemoryCustomerDirectory::new();
        let coupons = InMemoryCouponDirectory::new();
        let stock = InMemoryStockLedger::new();
        let gateway = DummyGateway::new();

        let mut gateways = GatewayRegistry::new();
        gateways.register(Arc::new(gateway.clone()));

        let mut events = EventBus::new();
        for listener in listeners {
            events.register(listener);
        }

        let services = CheckoutServices {
            carts: Arc::new(carts.clone()),
            customers: Arc::new(customers.clone()),
            coupons: Arc::new(coupons.clone()),
            stock: Arc::new(stock.clone()),
            gateways: Arc::new(gateways),
            events: Arc::new(events),
        };

        let pipeline =
            CheckoutPipeline::new(services, CheckoutConfig::default(), FormRegistry::new());

        let session = SessionId::new();
        carts.create_cart(session);

        Self {
            pipeline,
            carts,
            customers,
            coupons,
            stock,
            gateway,
            session,
        }
    }

    async fn add_item(&self, product: &str, quantity: u32, cents: i64) {
        let mut order = self.carts.current_cart(&self.session).await.unwrap();
        order
            .add_line_item(LineItem::new(product, quantity, Money::from_cents(cents)))
            .unwrap();
        self.carts.save(&order).await.unwrap();
    }

    async fn cart(&self) -> Order {
        self.carts.current_cart(&self.session).await.unwrap()
    }
}

fn card_request() -> CheckoutRequest {
    CheckoutRequest::new()
        .set("gateway", json!("dummy"))
        .set("card_number", json!("4242424242424242"))
        .set("expiry_month", json!("12"))
        .set("expiry_year", json!("2030"))
        .set("cvc", json!("123"))
}

// Recomputed total <= 0 ⇒ paid without invoking any gateway.
#[tokio::test]
async fn zero_total_is_paid_without_gateway_interaction() {
    let h = TestHarness::new();
    let coupon = Coupon::new("EVERYTHING", Discount::Fixed(Money::from_cents(5000)));
    h.coupons.insert(coupon);
    h.add_item("p1", 1, 3000).await;

    let complete = h
        .pipeline
        .checkout(&h.session, CheckoutRequest::new().set("coupon", json!("EVERYTHING")))
        .await
        .unwrap();

    assert!(complete.cart.is_paid());
    assert!(complete.cart.grand_total().is_nothing_due());
    assert_eq!(h.gateway.charge_count(), 0);
}

// Missing gateway with a positive total aborts before any payment-side
// mutation.
#[tokio::test]
async fn missing_gateway_aborts_with_no_payment_mutation() {
    let h = TestHarness::new();
    h.add_item("p1", 2, 1500).await;

    let err = h
        .pipeline
        .checkout(&h.session, CheckoutRequest::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::GatewayNotProvided));

    let cart = h.cart().await;
    assert!(!cart.is_paid());
    assert!(cart.paid_at().is_none());
    assert_eq!(cart.line_items().len(), 1);
    assert_eq!(h.gateway.charge_count(), 0);
    assert!(h.carts.has_cart(&h.session));
}

// A stock shortage removes exactly the offending line item; every other
// item survives the persisted repair.
#[tokio::test]
async fn stock_shortage_repair_is_surgical() {
    let h = TestHarness::new();
    h.add_item("keep-1", 1, 1000).await;
    h.add_item("short", 3, 700).await;
    h.add_item("keep-2", 2, 400).await;
    h.stock.set_stock("short", 2);

    let err = h.pipeline.checkout(&h.session, card_request()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::OutOfStock(ref p) if p.as_str() == "short"));

    let cart = h.cart().await;
    let products: Vec<&str> = cart
        .line_items()
        .iter()
        .map(|item| item.product_id.as_str())
        .collect();
    assert_eq!(products, ["keep-1", "keep-2"]);
}

// Variants of one product share a product id; the repair removes the
// first matching line item only.
#[tokio::test]
async fn stock_repair_with_shared_product_id_removes_one_item() {
    let h = TestHarness::new();
    let mut order = h.cart().await;
    order
        .add_line_item(LineItem::new("shirt", 1, Money::from_cents(1000)).with_variant("small"))
        .unwrap();
    order
        .add_line_item(LineItem::new("shirt", 1, Money::from_cents(1000)).with_variant("large"))
        .unwrap();
    h.carts.save(&order).await.unwrap();
    h.stock.set_stock("shirt", 0);

    let _ = h.pipeline.checkout(&h.session, card_request()).await.unwrap_err();

    let cart = h.cart().await;
    assert_eq!(cart.line_items().len(), 1);
    assert_eq!(cart.line_items()[0].variant.as_deref(), Some("large"));
}

// Coupon redemption happens exactly once, after payment success, and a
// repeated post-checkout pass must not double-redeem.
#[tokio::test]
async fn coupon_redeemed_once_even_if_post_checkout_repeats() {
    let h = TestHarness::new();
    let coupon = Coupon::new("SAVE10", Discount::Percentage(10));
    h.coupons.insert(coupon.clone());
    h.add_item("p1", 1, 10_000).await;

    let complete = h
        .pipeline
        .checkout(&h.session, card_request().set("coupon", json!("SAVE10")))
        .await
        .unwrap();

    assert_eq!(complete.cart.grand_total().cents(), 9000);
    let stored = h.coupons.find(coupon.id()).await.unwrap().unwrap();
    assert_eq!(stored.times_redeemed(), 1);

    // Re-run the post-checkout stage on the finalized order.
    let stage = RunPostCheckout::new(
        Arc::new(h.customers.clone()),
        Arc::new(h.coupons.clone()),
        Arc::new(h.carts.clone()),
    );
    let ctx = CheckoutContext::new(h.session, complete.cart, CheckoutRequest::new());
    stage.process(ctx).await.unwrap();

    let stored = h.coupons.find(coupon.id()).await.unwrap().unwrap();
    assert_eq!(stored.times_redeemed(), 1);
}

// A failed checkout never redeems the coupon.
#[tokio::test]
async fn failed_checkout_does_not_redeem_coupon() {
    let h = TestHarness::new();
    let coupon = Coupon::new("SAVE10", Discount::Percentage(10));
    h.coupons.insert(coupon.clone());
    h.add_item("p1", 1, 10_000).await;
    h.gateway.set_decline(true);

    let err = h
        .pipeline
        .checkout(&h.session, card_request().set("coupon", json!("SAVE10")))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Gateway(_)));

    let stored = h.coupons.find(coupon.id()).await.unwrap().unwrap();
    assert_eq!(stored.times_redeemed(), 0);
}

// Keys consumed by earlier stages are never re-applied by the free-form
// merge, while unconsumed whitelisted keys land on the order.
#[tokio::test]
async fn consumed_keys_are_isolated_from_free_form_merge() {
    let h = TestHarness::new();
    h.add_item("p1", 1, 1000).await;

    let request = card_request()
        .set("email", json!("jo@example.com"))
        .set("coupon", json!(""))
        .set("_token", json!("csrf-token"))
        .set("shipping_city", json!("Hull"));

    let complete = h.pipeline.checkout(&h.session, request).await.unwrap();

    assert_eq!(complete.cart.data().get("shipping_city"), Some(&json!("Hull")));
    for key in ["email", "gateway", "card_number", "expiry_month", "expiry_year", "cvc", "_token"]
    {
        assert!(!complete.cart.data().contains_key(key), "{key} leaked into order data");
    }
}

// Stock-then-zero-total scenario: the shortage repair runs before
// payment; the follow-up attempt on the emptied cart auto-pays.
#[tokio::test]
async fn emptied_cart_after_stock_repair_auto_pays() {
    let h = TestHarness::new();
    h.add_item("p1", 1, 1000).await;
    h.stock.set_stock("p1", 0);

    let err = h
        .pipeline
        .checkout(&h.session, CheckoutRequest::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::OutOfStock(_)));
    assert!(h.cart().await.line_items().is_empty());

    // The cart survived; checking out again owes nothing.
    let complete = h
        .pipeline
        .checkout(&h.session, CheckoutRequest::new())
        .await
        .unwrap();

    assert!(complete.cart.is_paid());
    assert_eq!(h.gateway.charge_count(), 0);
    assert!(!h.carts.has_cart(&h.session));
}

// Email-only request creates a published customer attached to the order.
#[tokio::test]
async fn email_only_request_creates_customer() {
    let h = TestHarness::new();

    let complete = h
        .pipeline
        .checkout(&h.session, CheckoutRequest::new().set("email", json!("a@example.com")))
        .await
        .unwrap();

    let customer = h
        .customers
        .find_by_email("a@example.com")
        .await
        .unwrap()
        .expect("customer created");
    assert!(customer.published());
    assert_eq!(customer.email(), "a@example.com");
    assert_eq!(complete.cart.customer_id(), Some(customer.id()));

    // Post-checkout recorded the order on the in-band history.
    assert_eq!(customer.orders(), &[complete.cart.id()]);
}

struct SundayVeto;

#[async_trait]
impl CheckoutListener for SundayVeto {
    async fn on_event(&self, event: &CheckoutEvent) -> Result<(), CheckoutError> {
        if let CheckoutEvent::PreCheckout { .. } = event {
            return Err(CheckoutError::Prevented("No checkout on Sundays.".to_string()));
        }
        Ok(())
    }
}

// Prevention surfaces the raised message verbatim and leaves the order
// byte-for-byte unchanged.
#[tokio::test]
async fn prevention_is_verbatim_and_non_mutating() {
    let h = TestHarness::with_listeners(vec![Arc::new(SundayVeto)]);
    h.add_item("p1", 1, 1000).await;
    let snapshot = h.cart().await;

    let err = h.pipeline.checkout(&h.session, card_request()).await.unwrap_err();

    match err {
        CheckoutError::Prevented(message) => assert_eq!(message, "No checkout on Sundays."),
        other => panic!("expected Prevented, got {other:?}"),
    }
    assert_eq!(h.cart().await, snapshot);
    assert_eq!(h.gateway.charge_count(), 0);
}

// Unknown coupon codes are rejected as field errors before any stage
// mutates the order.
#[tokio::test]
async fn unknown_coupon_is_a_field_error() {
    let h = TestHarness::new();
    h.add_item("p1", 1, 1000).await;
    let snapshot = h.cart().await;

    let err = h
        .pipeline
        .checkout(&h.session, card_request().set("coupon", json!("GHOST")))
        .await
        .unwrap_err();

    match err {
        CheckoutError::Validation(errors) => {
            assert_eq!(errors.for_field("coupon"), ["This coupon does not exist."]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(h.cart().await, snapshot);
}

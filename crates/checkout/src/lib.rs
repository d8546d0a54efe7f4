//! Checkout orchestration for the commerce core.
//!
//! A checkout attempt runs a fixed-order pipeline of stages over the
//! shopper's cart:
//! 1. Emit the pre-checkout event (listeners may veto)
//! 2. Additional validation (form rules + gateway rules + coupon + email)
//! 3. Customer resolution (find-or-create by email)
//! 4. Coupon application
//! 5. Stock verification
//! 6. Merge of remaining whitelisted free-form fields
//! 7. Payment dispatch
//! 8. Post-checkout side effects
//! 9. Emit the post-checkout event
//!
//! A stock shortage is recoverable: the orchestrator removes the
//! offending line item and the cart survives. Everything else surfaces as
//! a typed, shopper-facing failure with the cart left in a valid state.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod forms;
pub mod gateway;
pub mod pipeline;
pub mod request;
pub mod rules;
pub mod services;
pub mod stages;

pub use config::CheckoutConfig;
pub use context::CheckoutContext;
pub use error::{CheckoutError, ValidationErrors};
pub use events::{CheckoutEvent, CheckoutListener, EventBus};
pub use forms::{CheckoutForm, FormRegistry};
pub use gateway::{DummyGateway, GatewayRegistry, PaymentGateway, PurchaseOutcome};
pub use pipeline::{CheckoutComplete, CheckoutPipeline, CheckoutServices};
pub use request::{CheckoutRequest, ConsumedKeys};
pub use rules::{Messages, Rule, RuleSet};
pub use services::{
    CartProvider, CouponDirectory, CustomerDirectory, InMemoryCartProvider,
    InMemoryCouponDirectory, InMemoryCustomerDirectory, InMemoryStockLedger, StockLedger,
};

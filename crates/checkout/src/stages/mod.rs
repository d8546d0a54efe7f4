//! Checkout pipeline stages.
//!
//! Each stage is a named strategy object over the shared
//! [`CheckoutContext`]: it consumes the context and either returns the
//! evolved context or aborts the attempt with a typed failure. The stage
//! order is fixed by the orchestrator and not reorderable by
//! configuration.

use async_trait::async_trait;

use crate::context::CheckoutContext;
use crate::error::CheckoutError;

mod coupon;
mod customer;
mod payment;
mod post_checkout;
mod remaining;
mod stock;
mod validation;

pub use coupon::ApplyCoupon;
pub use customer::ResolveCustomer;
pub use payment::DispatchPayment;
pub use post_checkout::RunPostCheckout;
pub use remaining::MergeRemainingData;
pub use stock::VerifyStock;
pub use validation::ValidateRequest;

/// One step of the checkout pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The stage name, used in tracing spans.
    fn name(&self) -> &'static str;

    /// Processes the context, returning the evolved context or aborting
    /// with a typed failure.
    async fn process(&self, ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError>;
}

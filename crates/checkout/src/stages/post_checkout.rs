//! Post-checkout side effects stage.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::services::{CartProvider, CouponDirectory, CustomerDirectory};

use super::Stage;

/// Runs the side effects of a completed checkout, in order: customer
/// order history, the zero-total paid safety net, coupon redemption, and
/// forgetting the shopper's cart.
///
/// Every step is idempotent: running the stage twice on the same order
/// records the order id once and redeems the coupon once.
pub struct RunPostCheckout {
    customers: Arc<dyn CustomerDirectory>,
    coupons: Arc<dyn CouponDirectory>,
    carts: Arc<dyn CartProvider>,
}

impl RunPostCheckout {
    /// Creates the stage.
    pub fn new(
        customers: Arc<dyn CustomerDirectory>,
        coupons: Arc<dyn CouponDirectory>,
        carts: Arc<dyn CartProvider>,
    ) -> Self {
        Self {
            customers,
            coupons,
            carts,
        }
    }
}

#[async_trait]
impl Stage for RunPostCheckout {
    fn name(&self) -> &'static str {
        "post_checkout"
    }

    async fn process(&self, mut ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError> {
        // Without an external customer model there is no relational join;
        // the customer record carries its own order history.
        if !self.customers.uses_external_model()
            && let Some(customer_id) = ctx.order.customer_id()
        {
            let mut customer = self
                .customers
                .find(customer_id)
                .await?
                .ok_or_else(|| CheckoutError::Store(format!("customer {customer_id} missing")))?;

            customer.record_order(ctx.order.id());
            self.customers.save(&customer).await?;
        }

        // Safety net kept alongside the payment stage's own zero-total
        // check; both are idempotent.
        if !ctx.order.is_paid() && ctx.order.grand_total().is_zero() {
            ctx.order.mark_paid();
            self.carts.save(&ctx.order).await?;
        }

        if let Some(coupon_id) = ctx.order.coupon_id()
            && !ctx.order.coupon_redeemed()
        {
            let mut coupon = self
                .coupons
                .find(coupon_id)
                .await?
                .ok_or_else(|| CheckoutError::Store(format!("coupon {coupon_id} missing")))?;

            coupon.redeem()?;
            self.coupons.save(&coupon).await?;

            ctx.order.mark_coupon_redeemed();
            self.carts.save(&ctx.order).await?;
        }

        self.carts.forget_cart(&ctx.session).await?;

        Ok(ctx)
    }
}

//! Coupon application stage.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CheckoutContext;
use crate::error::{CheckoutError, ValidationErrors};
use crate::services::{CartProvider, CouponDirectory};

use super::Stage;

/// Attaches the requested coupon to the order.
///
/// The code's validity was already checked by the validation stage;
/// redemption is deferred to post-checkout so a coupon is never consumed
/// by a checkout that ultimately fails.
pub struct ApplyCoupon {
    coupons: Arc<dyn CouponDirectory>,
    carts: Arc<dyn CartProvider>,
}

impl ApplyCoupon {
    /// Creates the stage.
    pub fn new(coupons: Arc<dyn CouponDirectory>, carts: Arc<dyn CartProvider>) -> Self {
        Self { coupons, carts }
    }
}

#[async_trait]
impl Stage for ApplyCoupon {
    fn name(&self) -> &'static str {
        "coupon"
    }

    async fn process(&self, mut ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError> {
        if let Some(code) = ctx.request.str_value("coupon") {
            // Validated earlier; a miss here means the directory changed
            // under us between stages.
            let coupon = self.coupons.find_by_code(code).await?.ok_or_else(|| {
                CheckoutError::Validation(ValidationErrors::single(
                    "coupon",
                    "This coupon does not exist.",
                ))
            })?;

            ctx.order.attach_coupon(coupon.id());
            self.carts.save(&ctx.order).await?;
            ctx.consumed.consume("coupon");
        }

        Ok(ctx)
    }
}

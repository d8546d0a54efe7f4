//! Payment dispatch stage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::gateway::GatewayRegistry;
use crate::services::{CartProvider, CouponDirectory};

use super::Stage;

/// Recomputes the total and, when something is due, dispatches the
/// purchase to the selected gateway.
///
/// The grand total is recomputed here because any earlier stage may have
/// changed what the order owes; a cached total is never trusted for a
/// payment decision. A zero-or-negative total marks the order paid with no
/// gateway interaction at all.
pub struct DispatchPayment {
    gateways: Arc<GatewayRegistry>,
    coupons: Arc<dyn CouponDirectory>,
    carts: Arc<dyn CartProvider>,
}

impl DispatchPayment {
    /// Creates the stage.
    pub fn new(
        gateways: Arc<GatewayRegistry>,
        coupons: Arc<dyn CouponDirectory>,
        carts: Arc<dyn CartProvider>,
    ) -> Self {
        Self {
            gateways,
            coupons,
            carts,
        }
    }
}

#[async_trait]
impl Stage for DispatchPayment {
    fn name(&self) -> &'static str {
        "payment"
    }

    async fn process(&self, mut ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError> {
        let coupon = match ctx.order.coupon_id() {
            Some(id) => self.coupons.find(id).await?,
            None => None,
        };

        let total = ctx.order.recalculate(coupon.as_ref());

        if total.is_nothing_due() {
            ctx.order.mark_paid();
            self.carts.save(&ctx.order).await?;
            return Ok(ctx);
        }

        if ctx.order.is_paid() {
            // Nothing left to charge.
            return Ok(ctx);
        }

        let Some(gateway_name) = ctx.request.str_value("gateway") else {
            return Err(CheckoutError::GatewayNotProvided);
        };

        let gateway = self
            .gateways
            .resolve(gateway_name)
            .ok_or_else(|| CheckoutError::UnknownGateway(gateway_name.to_string()))?;

        let outcome = gateway.purchase(&ctx.request, &ctx.order).await?;

        if outcome.paid {
            ctx.order.mark_paid();
        }
        if let Some(reference) = outcome.reference {
            ctx.order.insert_data("payment_reference", Value::String(reference));
        }
        self.carts.save(&ctx.order).await?;

        ctx.consumed.consume("gateway");
        ctx.consumed.consume_all(gateway.purchase_rules().into_keys());

        ctx.order = self.carts.refresh(ctx.order.id()).await?;

        Ok(ctx)
    }
}

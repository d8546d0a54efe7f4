//! Checkout orchestrator.

use std::sync::Arc;

use serde::Serialize;

use common::{OrderId, SessionId};
use domain::{Order, ProductId};

use crate::config::CheckoutConfig;
use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::events::{CheckoutEvent, EventBus};
use crate::forms::FormRegistry;
use crate::gateway::GatewayRegistry;
use crate::request::CheckoutRequest;
use crate::services::{CartProvider, CouponDirectory, CustomerDirectory, StockLedger};
use crate::stages::{
    ApplyCoupon, DispatchPayment, MergeRemainingData, ResolveCustomer, RunPostCheckout, Stage,
    ValidateRequest, VerifyStock,
};

/// The external collaborators a checkout runs against.
#[derive(Clone)]
pub struct CheckoutServices {
    pub carts: Arc<dyn CartProvider>,
    pub customers: Arc<dyn CustomerDirectory>,
    pub coupons: Arc<dyn CouponDirectory>,
    pub stock: Arc<dyn StockLedger>,
    pub gateways: Arc<GatewayRegistry>,
    pub events: Arc<EventBus>,
}

/// A finalized checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutComplete {
    /// Shopper-facing completion message.
    pub message: String,

    /// The finalized order.
    pub cart: Order,

    /// Marks the response as produced by a checkout submission.
    pub is_checkout_request: bool,
}

/// Orchestrates a checkout attempt as a fixed-order pipeline of stages.
///
/// Every attempt either finalizes the order or fails with one of the
/// typed [`CheckoutError`] kinds; a stock shortage additionally repairs
/// the cart by removing the offending line item before surfacing, so the
/// cart is always left valid and continuable.
pub struct CheckoutPipeline {
    services: CheckoutServices,
    stages: Vec<Box<dyn Stage>>,
}

impl CheckoutPipeline {
    /// Builds the pipeline with its fixed stage order. The order is not
    /// reorderable by configuration.
    pub fn new(services: CheckoutServices, config: CheckoutConfig, forms: FormRegistry) -> Self {
        let config = Arc::new(config);
        let forms = Arc::new(forms);

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(ValidateRequest::new(
                services.gateways.clone(),
                services.coupons.clone(),
                forms,
            )),
            Box::new(ResolveCustomer::new(
                services.customers.clone(),
                services.carts.clone(),
                config.clone(),
            )),
            Box::new(ApplyCoupon::new(
                services.coupons.clone(),
                services.carts.clone(),
            )),
            Box::new(VerifyStock::new(services.stock.clone())),
            Box::new(MergeRemainingData::new(services.carts.clone(), config)),
            Box::new(DispatchPayment::new(
                services.gateways.clone(),
                services.coupons.clone(),
                services.carts.clone(),
            )),
            Box::new(RunPostCheckout::new(
                services.customers.clone(),
                services.coupons.clone(),
                services.carts.clone(),
            )),
        ];

        Self { services, stages }
    }

    /// Runs a checkout attempt for the session's current cart.
    #[tracing::instrument(skip(self, request), fields(%session))]
    pub async fn checkout(
        &self,
        session: &SessionId,
        request: CheckoutRequest,
    ) -> Result<CheckoutComplete, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let order = self.services.carts.current_cart(session).await?;
        let order_id = order.id();

        let outcome = match self.run_stages(session, order, request.clone()).await {
            Ok(ctx) => {
                // Strictly after every post-checkout mutation.
                self.services
                    .events
                    .emit_unchecked(&CheckoutEvent::post(ctx.order.clone(), request))
                    .await;

                metrics::counter!("checkout_completed_total").increment(1);
                tracing::info!(%order_id, "checkout complete");

                Ok(CheckoutComplete {
                    message: "Checkout Complete!".to_string(),
                    cart: ctx.order,
                    is_checkout_request: true,
                })
            }
            Err(CheckoutError::OutOfStock(product_id)) => {
                self.remove_offending_item(order_id, &product_id).await?;
                metrics::counter!("checkout_failed_total", "reason" => "stock").increment(1);
                Err(CheckoutError::OutOfStock(product_id))
            }
            Err(error) => {
                metrics::counter!("checkout_failed_total", "reason" => failure_reason(&error))
                    .increment(1);
                Err(error)
            }
        };

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        outcome
    }

    /// Emits the pre-checkout event and drives the stages in order.
    async fn run_stages(
        &self,
        session: &SessionId,
        order: Order,
        request: CheckoutRequest,
    ) -> Result<CheckoutContext, CheckoutError> {
        self.services
            .events
            .emit(&CheckoutEvent::pre(order.clone(), request.clone()))
            .await?;

        let mut ctx = CheckoutContext::new(*session, order, request);
        for stage in &self.stages {
            tracing::debug!(stage = stage.name(), "running checkout stage");
            ctx = stage.process(ctx).await?;
        }
        Ok(ctx)
    }

    /// Stock-shortage repair: remove exactly the line item matching the
    /// offending product and persist, leaving the rest of the cart
    /// intact.
    async fn remove_offending_item(
        &self,
        order_id: OrderId,
        product_id: &ProductId,
    ) -> Result<(), CheckoutError> {
        let mut order = self.services.carts.refresh(order_id).await?;

        if let Some(item_id) = order.line_item_for_product(product_id).map(|item| item.id) {
            order.remove_line_item(item_id)?;
            self.services.carts.save(&order).await?;
            tracing::warn!(%order_id, %product_id, "removed out-of-stock line item");
        }

        Ok(())
    }
}

fn failure_reason(error: &CheckoutError) -> &'static str {
    match error {
        CheckoutError::Validation(_) => "validation",
        CheckoutError::OutOfStock(_) => "stock",
        CheckoutError::Prevented(_) => "prevented",
        CheckoutError::GatewayNotProvided | CheckoutError::UnknownGateway(_) => "gateway_config",
        CheckoutError::Gateway(_) => "gateway",
        CheckoutError::CartNotFound(_) | CheckoutError::OrderNotFound(_) => "missing_cart",
        CheckoutError::Store(_) => "store",
        CheckoutError::Domain(_) => "domain",
    }
}

//! Free-form field merge stage.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::CheckoutConfig;
use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::services::CartProvider;

use super::Stage;

/// Merges whatever request fields no stage claimed onto the order's data
/// bag, restricted to the order field whitelist.
///
/// Checkbox-style `"on"`/`"off"` strings are converted to booleans.
/// Consumed keys are skipped, so a field a stage interpreted (email,
/// coupon, gateway fields) is never double-applied as an arbitrary order
/// field.
pub struct MergeRemainingData {
    carts: Arc<dyn CartProvider>,
    config: Arc<CheckoutConfig>,
}

impl MergeRemainingData {
    /// Creates the stage.
    pub fn new(carts: Arc<dyn CartProvider>, config: Arc<CheckoutConfig>) -> Self {
        Self { carts, config }
    }

    fn normalize(value: &Value) -> Value {
        match value.as_str() {
            Some("on") => Value::Bool(true),
            Some("off") => Value::Bool(false),
            _ => value.clone(),
        }
    }
}

#[async_trait]
impl Stage for MergeRemainingData {
    fn name(&self) -> &'static str {
        "remaining_data"
    }

    async fn process(&self, mut ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError> {
        let remaining: BTreeMap<String, Value> = ctx
            .request
            .entries()
            .filter(|(key, _)| !ctx.consumed.is_consumed(key))
            .map(|(key, value)| (key.clone(), Self::normalize(value)))
            .collect();

        if !remaining.is_empty() {
            ctx.order.merge_fields(&remaining, &self.config.order_fields);
            self.carts.save(&ctx.order).await?;
            ctx.order = self.carts.refresh(ctx.order.id()).await?;
        }

        Ok(ctx)
    }
}

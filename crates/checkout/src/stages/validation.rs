//! Additional validation stage.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CheckoutContext;
use crate::error::{CheckoutError, ValidationErrors};
use crate::forms::FormRegistry;
use crate::gateway::GatewayRegistry;
use crate::rules::{self, Messages, Rule, RuleSet};
use crate::services::CouponDirectory;

use super::Stage;

/// Merges every applicable rule source into one validation pass: the base
/// checkout rules, the named form selected by `_request` (if any), and the
/// selected gateway's purchase rules. Field failures surface per field;
/// they are not pipeline aborts in the stock/prevention sense and nothing
/// has mutated the order yet.
pub struct ValidateRequest {
    gateways: Arc<GatewayRegistry>,
    coupons: Arc<dyn CouponDirectory>,
    forms: Arc<FormRegistry>,
}

impl ValidateRequest {
    /// Creates the stage.
    pub fn new(
        gateways: Arc<GatewayRegistry>,
        coupons: Arc<dyn CouponDirectory>,
        forms: Arc<FormRegistry>,
    ) -> Self {
        Self {
            gateways,
            coupons,
            forms,
        }
    }

    fn base_rules() -> RuleSet {
        let mut set = RuleSet::new();
        set.insert("email".to_string(), vec![Rule::Email, Rule::NoWhitespace]);
        set
    }
}

#[async_trait]
impl Stage for ValidateRequest {
    fn name(&self) -> &'static str {
        "validation"
    }

    async fn process(&self, ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError> {
        let mut rule_set = Self::base_rules();
        let mut messages = Messages::new();
        let mut errors = ValidationErrors::new();

        if let Some(form_name) = ctx.request.str_value("_request") {
            match self.forms.get(form_name) {
                Some(form) => {
                    rules::merge_rules(&mut rule_set, form.rules.clone());
                    messages.extend(form.messages.clone());
                }
                None => {
                    errors.add("_request", format!("The form '{form_name}' does not exist."));
                }
            }
        }

        if let Some(gateway_name) = ctx.request.str_value("gateway") {
            // An unknown gateway has no rules to contribute; the payment
            // stage rejects the name itself.
            if let Some(gateway) = self.gateways.resolve(gateway_name) {
                rules::merge_rules(&mut rule_set, gateway.purchase_rules());
                messages.extend(gateway.purchase_messages());
            }
        }

        errors.merge(rules::evaluate(&ctx.request, &rule_set, &messages));

        if let Some(code) = ctx.request.str_value("coupon") {
            match self.coupons.find_by_code(code).await? {
                None => errors.add("coupon", "This coupon does not exist."),
                Some(coupon) if !coupon.is_redeemable() => {
                    errors.add("coupon", "This coupon has reached its usage limit.");
                }
                Some(_) => {}
            }
        }

        if !errors.is_empty() {
            return Err(CheckoutError::Validation(errors));
        }

        Ok(ctx)
    }
}

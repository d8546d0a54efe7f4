//! Customer resolution stage.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use domain::{Customer, CustomerId};

use crate::config::CheckoutConfig;
use crate::context::CheckoutContext;
use crate::error::{CheckoutError, ValidationErrors};
use crate::services::{CartProvider, CustomerDirectory};

use super::Stage;

/// Finds or creates the customer for the order.
///
/// Candidate identity is derived from recognized request fields with
/// first-match precedence: full name + email, then split first/last name +
/// email, then email alone. A missing directory entry is a normal control
/// path that triggers creation, never a failure.
pub struct ResolveCustomer {
    customers: Arc<dyn CustomerDirectory>,
    carts: Arc<dyn CartProvider>,
    config: Arc<CheckoutConfig>,
}

impl ResolveCustomer {
    /// Creates the stage.
    pub fn new(
        customers: Arc<dyn CustomerDirectory>,
        carts: Arc<dyn CartProvider>,
        config: Arc<CheckoutConfig>,
    ) -> Self {
        Self {
            customers,
            carts,
            config,
        }
    }

    /// Collects identity fields out of the request, consuming the keys
    /// the taken branch interpreted.
    fn candidate_identity(ctx: &mut CheckoutContext) -> BTreeMap<String, Value> {
        let mut fields: BTreeMap<String, Value> = ctx
            .request
            .customer_object()
            .map(|object| object.clone().into_iter().collect())
            .unwrap_or_default();

        let request = &ctx.request;
        if request.has("name") && request.has("email") {
            for key in ["name", "email"] {
                if let Some(value) = request.get(key) {
                    fields.insert(key.to_string(), value.clone());
                }
            }
            ctx.consumed.consume_all(["name", "email"]);
        } else if request.has("first_name") && request.has("last_name") && request.has("email") {
            for key in ["first_name", "last_name", "email"] {
                if let Some(value) = request.get(key) {
                    fields.insert(key.to_string(), value.clone());
                }
            }
            ctx.consumed.consume_all(["first_name", "last_name", "email"]);
        } else if request.has("email") {
            if let Some(value) = request.get("email") {
                fields.insert("email".to_string(), value.clone());
            }
            ctx.consumed.consume("email");
        }

        fields
    }

    fn build_customer(email: &str, fields: &BTreeMap<String, Value>) -> Customer {
        let mut customer = Customer::new(email);

        if let Some(name) = fields.get("name").and_then(Value::as_str) {
            customer = customer.with_name(name);
        }

        if let (Some(first), Some(last)) = (
            fields.get("first_name").and_then(Value::as_str),
            fields.get("last_name").and_then(Value::as_str),
        ) {
            customer = customer.with_split_name(first, last);
        }

        customer
    }
}

#[async_trait]
impl Stage for ResolveCustomer {
    fn name(&self) -> &'static str {
        "customer"
    }

    async fn process(&self, mut ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError> {
        // A plain string value is an existing customer id; attach it
        // without touching the directory.
        if let Some(Value::String(raw_id)) = ctx.request.get("customer") {
            let customer_id = raw_id
                .parse()
                .map(CustomerId::from_uuid)
                .map_err(|_| {
                    CheckoutError::Validation(ValidationErrors::single(
                        "customer",
                        "The customer field must be a valid customer id.",
                    ))
                })?;

            ctx.order.attach_customer(customer_id);
            self.carts.save(&ctx.order).await?;
            ctx.consumed.consume("customer");

            return Ok(ctx);
        }

        let fields = Self::candidate_identity(&mut ctx);

        if let Some(email) = fields.get("email").and_then(Value::as_str) {
            let mut customer = match self.customers.find_by_email(email).await? {
                Some(existing) => existing,
                None => {
                    let created = Self::build_customer(email, &fields);
                    self.customers.save(&created).await?;
                    created
                }
            };

            customer.merge_fields(&fields, &self.config.customer_fields);
            self.customers.save(&customer).await?;

            ctx.order.attach_customer(customer.id());
            self.carts.save(&ctx.order).await?;
            ctx.order = self.carts.refresh(ctx.order.id()).await?;
        }

        ctx.consumed.consume("customer");

        Ok(ctx)
    }
}

//! Checkout error taxonomy.
//!
//! Every variant is resolved at the pipeline boundary: nothing escapes a
//! checkout attempt as an unhandled fault.

use std::collections::BTreeMap;

use common::{OrderId, SessionId};
use domain::{DomainError, ProductId};
use serde::Serialize;
use thiserror::Error;

/// Field-level validation failures, keyed by request field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set with a single field message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Folds another error set into this one.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Returns true if no field has failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the messages recorded for a field.
    pub fn for_field(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the field → messages map.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors that can abort a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Malformed or missing input, surfaced per field. No order mutation
    /// has taken place.
    #[error("Checkout validation failed: {0}")]
    Validation(ValidationErrors),

    /// A line item's product has insufficient stock. Recoverable: the
    /// pipeline removes the offending line item and the cart survives.
    #[error("Product {0} has no stock left")]
    OutOfStock(ProductId),

    /// A listener or stage deliberately blocked the checkout. The message
    /// is surfaced to the shopper verbatim and the cart is left untouched.
    #[error("{0}")]
    Prevented(String),

    /// A non-zero total is due but the request named no gateway. Distinct
    /// from validation: without a gateway there are no rules to validate.
    #[error("No payment gateway provided")]
    GatewayNotProvided,

    /// The request named a gateway that is not registered.
    #[error("Unknown payment gateway: {0}")]
    UnknownGateway(String),

    /// The gateway refused or failed the purchase.
    #[error("Payment failed: {0}")]
    Gateway(String),

    /// No cart exists for the session.
    #[error("No cart for session {0}")]
    CartNotFound(SessionId),

    /// An order referenced by the pipeline is missing from the store.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// An external store/directory failed.
    #[error("Store error: {0}")]
    Store(String),

    /// A domain invariant was violated.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CheckoutError {
    /// Returns true if the cart survives this failure in a continuable
    /// state after automatic repair.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CheckoutError::OutOfStock(_))
    }
}

impl From<domain::OrderError> for CheckoutError {
    fn from(err: domain::OrderError) -> Self {
        CheckoutError::Domain(DomainError::Order(err))
    }
}

impl From<domain::CouponError> for CheckoutError {
    fn from(err: domain::CouponError) -> Self {
        CheckoutError::Domain(DomainError::Coupon(err))
    }
}

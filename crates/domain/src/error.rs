//! Domain error types.

use thiserror::Error;

use crate::coupon::CouponError;
use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred on the order aggregate.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// An error occurred on a coupon.
    #[error("Coupon error: {0}")]
    Coupon(#[from] CouponError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

//! Order aggregate and related types.

mod aggregate;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use state::PaymentStatus;
pub use value_objects::{LineItem, LineItemId, Money, ProductId};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Line item not found in the order.
    #[error("Line item not found: {line_item_id}")]
    LineItemNotFound { line_item_id: LineItemId },

    /// The order is already paid and can no longer be modified.
    #[error("Cannot {action}: order is already paid")]
    AlreadyPaid { action: &'static str },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },
}

//! Payment status of an order.

use serde::{Deserialize, Serialize};

/// Whether an order has been paid for.
///
/// The transition is one-way: `Unpaid ──► Paid`. A cart starts unpaid and
/// is marked paid either by a gateway purchase or automatically when the
/// recomputed grand total is zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// No successful payment has been recorded.
    #[default]
    Unpaid,

    /// Payment has been recorded; the order is finalized.
    Paid,
}

impl PaymentStatus {
    /// Returns true if the order has been paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

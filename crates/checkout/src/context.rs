//! The evolving state threaded through pipeline stages.

use common::SessionId;
use domain::Order;

use crate::request::{CheckoutRequest, ConsumedKeys};

/// Everything a stage consumes and returns: the order being checked out,
/// the raw request, and the accumulated set of consumed request keys.
///
/// Stages take the context by value and hand it back, so mutation is
/// explicit in each stage's signature rather than shared through the
/// orchestrator.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    /// The shopper's session, used by post-checkout to forget the cart.
    pub session: SessionId,

    /// The order being checked out.
    pub order: Order,

    /// The raw request submission.
    pub request: CheckoutRequest,

    /// Request keys already interpreted by earlier stages.
    pub consumed: ConsumedKeys,
}

impl CheckoutContext {
    /// Creates the initial context for a checkout attempt.
    pub fn new(session: SessionId, order: Order, request: CheckoutRequest) -> Self {
        Self {
            session,
            order,
            request,
            consumed: ConsumedKeys::new(),
        }
    }
}

//! Stock verification stage.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::services::StockLedger;

use super::Stage;

/// Checks every line item against available inventory.
///
/// Fails on the first insufficient item with a reference to the offending
/// *product* — the orchestrator re-locates the line item by product
/// identity, since several line items can reference variants of the same
/// product. Verification itself never mutates the order.
pub struct VerifyStock {
    stock: Arc<dyn StockLedger>,
}

impl VerifyStock {
    /// Creates the stage.
    pub fn new(stock: Arc<dyn StockLedger>) -> Self {
        Self { stock }
    }
}

#[async_trait]
impl Stage for VerifyStock {
    fn name(&self) -> &'static str {
        "stock"
    }

    async fn process(&self, ctx: CheckoutContext) -> Result<CheckoutContext, CheckoutError> {
        for item in ctx.order.line_items() {
            if let Some(available) = self.stock.available(&item.product_id).await?
                && available < item.quantity
            {
                tracing::warn!(
                    product_id = %item.product_id,
                    available,
                    wanted = item.quantity,
                    "insufficient stock"
                );
                return Err(CheckoutError::OutOfStock(item.product_id.clone()));
            }
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{OrderId, SessionId};
    use domain::{LineItem, Money, Order, ProductId};

    use crate::request::CheckoutRequest;
    use crate::services::InMemoryStockLedger;

    fn ctx_with(order: Order) -> CheckoutContext {
        CheckoutContext::new(SessionId::new(), order, CheckoutRequest::new())
    }

    fn cart(entries: &[(&str, u32)]) -> Order {
        let mut order = Order::new(OrderId::new());
        for (product, quantity) in entries {
            order
                .add_line_item(LineItem::new(*product, *quantity, Money::from_cents(1000)))
                .unwrap();
        }
        order
    }

    #[tokio::test]
    async fn untracked_products_pass() {
        let stage = VerifyStock::new(Arc::new(InMemoryStockLedger::new()));
        assert!(stage.process(ctx_with(cart(&[("p1", 3)]))).await.is_ok());
    }

    #[tokio::test]
    async fn sufficient_stock_passes() {
        let ledger = InMemoryStockLedger::new();
        ledger.set_stock("p1", 3);
        let stage = VerifyStock::new(Arc::new(ledger));

        assert!(stage.process(ctx_with(cart(&[("p1", 3)]))).await.is_ok());
    }

    #[tokio::test]
    async fn first_shortage_fails_with_the_product() {
        let ledger = InMemoryStockLedger::new();
        ledger.set_stock("p1", 5);
        ledger.set_stock("p2", 1);
        let stage = VerifyStock::new(Arc::new(ledger));

        let err = stage
            .process(ctx_with(cart(&[("p1", 2), ("p2", 2)])))
            .await
            .unwrap_err();

        match err {
            CheckoutError::OutOfStock(product) => {
                assert_eq!(product, ProductId::new("p2"));
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn verification_does_not_mutate_the_order() {
        let ledger = InMemoryStockLedger::new();
        ledger.set_stock("p1", 0);
        let stage = VerifyStock::new(Arc::new(ledger));

        let order = cart(&[("p1", 1), ("p2", 1)]);
        let snapshot = order.clone();
        let ctx = ctx_with(order);

        let _ = stage.process(ctx.clone()).await.unwrap_err();
        assert_eq!(ctx.order, snapshot);
    }
}

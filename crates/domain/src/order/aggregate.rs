//! Order aggregate implementation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coupon::{Coupon, CouponId};
use crate::customer::CustomerId;

use super::{LineItem, LineItemId, Money, OrderError, PaymentStatus, ProductId};

/// Order aggregate root.
///
/// A cart is an order that has not completed checkout: the same record is
/// mutated at every checkout stage and finalized when payment succeeds.
/// Customer and coupon are weak references by id; the owning directories
/// hold the records themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: OrderId,

    /// Line items in cart order.
    line_items: Vec<LineItem>,

    /// Customer who owns the order, once resolved.
    customer_id: Option<CustomerId>,

    /// Coupon applied to the order, if any.
    coupon_id: Option<CouponId>,

    /// Whether the coupon has been redeemed for this order.
    coupon_redeemed: bool,

    /// Payment status.
    payment_status: PaymentStatus,

    /// When the order was marked paid.
    paid_at: Option<DateTime<Utc>>,

    /// Shipping cost, included in the grand total.
    shipping_total: Money,

    /// Cached grand total. Recomputed by [`Order::recalculate`]; never
    /// trusted across a mutation.
    grand_total: Money,

    /// Schema-less additional fields merged in during checkout.
    data: BTreeMap<String, Value>,
}

impl Order {
    /// Creates a new empty order (a fresh cart).
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            line_items: Vec::new(),
            customer_id: None,
            coupon_id: None,
            coupon_redeemed: false,
            payment_status: PaymentStatus::Unpaid,
            paid_at: None,
            shipping_total: Money::ZERO,
            grand_total: Money::ZERO,
            data: BTreeMap::new(),
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the line items in cart order.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Returns true if the order has at least one line item.
    pub fn has_items(&self) -> bool {
        !self.line_items.is_empty()
    }

    /// Returns the first line item referencing the given product, if any.
    pub fn line_item_for_product(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.line_items
            .iter()
            .find(|item| &item.product_id == product_id)
    }

    /// Returns the customer reference.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    /// Returns the coupon reference.
    pub fn coupon_id(&self) -> Option<CouponId> {
        self.coupon_id
    }

    /// Returns true if the coupon has been redeemed for this order.
    pub fn coupon_redeemed(&self) -> bool {
        self.coupon_redeemed
    }

    /// Returns the payment status.
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Returns true if the order has been paid.
    pub fn is_paid(&self) -> bool {
        self.payment_status.is_paid()
    }

    /// Returns when the order was marked paid.
    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// Returns the shipping total.
    pub fn shipping_total(&self) -> Money {
        self.shipping_total
    }

    /// Sets the shipping total.
    pub fn set_shipping_total(&mut self, total: Money) {
        self.shipping_total = total;
    }

    /// Returns the cached grand total, as of the last
    /// [`Order::recalculate`].
    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    /// Returns the sum of all line item totals.
    pub fn items_subtotal(&self) -> Money {
        self.line_items.iter().map(LineItem::total).sum()
    }

    /// Returns the free-form data bag.
    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }
}

// Mutations
impl Order {
    /// Adds a line item, returning its ID.
    pub fn add_line_item(&mut self, item: LineItem) -> Result<LineItemId, OrderError> {
        if self.is_paid() {
            return Err(OrderError::AlreadyPaid { action: "add a line item" });
        }
        if item.quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity: item.quantity });
        }

        let id = item.id;
        self.line_items.push(item);
        Ok(id)
    }

    /// Removes the line item with the given ID, returning it.
    pub fn remove_line_item(&mut self, line_item_id: LineItemId) -> Result<LineItem, OrderError> {
        let position = self
            .line_items
            .iter()
            .position(|item| item.id == line_item_id)
            .ok_or(OrderError::LineItemNotFound { line_item_id })?;

        Ok(self.line_items.remove(position))
    }

    /// Attaches a customer by id.
    pub fn attach_customer(&mut self, customer_id: CustomerId) {
        self.customer_id = Some(customer_id);
    }

    /// Attaches a coupon by id.
    pub fn attach_coupon(&mut self, coupon_id: CouponId) {
        self.coupon_id = Some(coupon_id);
    }

    /// Records that the attached coupon was redeemed for this order.
    pub fn mark_coupon_redeemed(&mut self) {
        self.coupon_redeemed = true;
    }

    /// Marks the order paid. Idempotent: the timestamp is set once.
    pub fn mark_paid(&mut self) {
        if !self.is_paid() {
            self.payment_status = PaymentStatus::Paid;
            self.paid_at = Some(Utc::now());
        }
    }

    /// Recomputes the grand total from line items, the applied coupon, and
    /// shipping, caching and returning the result.
    ///
    /// Must be called immediately before any payment decision; the cached
    /// value is stale after any line item or coupon change.
    pub fn recalculate(&mut self, coupon: Option<&Coupon>) -> Money {
        let subtotal = self.items_subtotal();
        let discount = coupon
            .map(|c| c.discount_on(subtotal))
            .unwrap_or(Money::ZERO);

        self.grand_total = subtotal - discount + self.shipping_total;
        self.grand_total
    }

    /// Inserts a single value into the free-form data bag.
    pub fn insert_data(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Merges the given fields into the data bag, restricted to the
    /// whitelist. Non-whitelisted keys are silently dropped.
    pub fn merge_fields(&mut self, fields: &BTreeMap<String, Value>, whitelist: &[String]) {
        for key in whitelist {
            if let Some(value) = fields.get(key) {
                self.data.insert(key.clone(), value.clone());
            }
        }
    }
}

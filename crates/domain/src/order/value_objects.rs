//! Value objects for the order domain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product identifier (SKU or entry id).
///
/// Several line items may reference different variants of the same product;
/// they share this identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a line item within an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    /// Creates a new random line item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount of money in the store's base currency, held as whole cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero in the base currency.
    pub const ZERO: Money = Money(0);

    /// Creates an amount from whole cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is zero or below.
    ///
    /// A cart can legitimately reach a negative total when a fixed-amount
    /// coupon exceeds the subtotal; such carts owe nothing.
    pub fn is_nothing_due(&self) -> bool {
        self.0 <= 0
    }

    /// Returns the given percentage of this amount, truncated to whole
    /// cents.
    pub fn percentage(&self, percent: u32) -> Money {
        Money(self.0 * i64::from(percent) / 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Mul<u32> for Money {
    type Output = Money;

    fn mul(self, quantity: u32) -> Money {
        Money(self.0 * i64::from(quantity))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}${}.{:02}", (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// One product/variant + quantity entry within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Identifier of this entry, stable across cart edits.
    pub id: LineItemId,

    /// The product this entry references.
    pub product_id: ProductId,

    /// Variant key within the product, if the product has variants.
    pub variant: Option<String>,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item with a fresh ID.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            id: LineItemId::new(),
            product_id: product_id.into(),
            variant: None,
            quantity,
            unit_price,
        }
    }

    /// Sets the variant key.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Returns the total for this entry (quantity × unit price).
    pub fn total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b * 3).cents(), 750);
    }

    #[test]
    fn money_sum_over_iterator() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn money_percentage_truncates() {
        assert_eq!(Money::from_cents(999).percentage(10).cents(), 99);
        assert_eq!(Money::from_cents(1000).percentage(25).cents(), 250);
    }

    #[test]
    fn money_nothing_due_includes_negative() {
        assert!(Money::ZERO.is_nothing_due());
        assert!(Money::from_cents(-500).is_nothing_due());
        assert!(!Money::from_cents(1).is_nothing_due());
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(-50).to_string(), "-$0.50");
    }

    #[test]
    fn money_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(995)).unwrap();
        assert_eq!(json, "995");
    }

    #[test]
    fn line_item_total() {
        let item = LineItem::new("prod-1", 3, Money::from_cents(1500));
        assert_eq!(item.total().cents(), 4500);
    }

    #[test]
    fn line_items_get_unique_ids() {
        let a = LineItem::new("prod-1", 1, Money::from_cents(100));
        let b = LineItem::new("prod-1", 1, Money::from_cents(100));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn line_item_variant() {
        let item = LineItem::new("prod-1", 1, Money::from_cents(100)).with_variant("large");
        assert_eq!(item.variant.as_deref(), Some("large"));
    }
}

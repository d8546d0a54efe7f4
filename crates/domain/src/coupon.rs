//! Coupon record and redemption.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::order::Money;

/// Unique identifier for a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponId(Uuid);

impl CouponId {
    /// Creates a new random coupon ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CouponId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CouponId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur on a coupon.
#[derive(Debug, Error)]
pub enum CouponError {
    /// The coupon's usage allowance is exhausted.
    #[error("Coupon '{code}' has reached its usage limit")]
    LimitReached { code: String },
}

/// How a coupon discounts an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discount {
    /// Percentage off the items subtotal.
    Percentage(u32),

    /// Fixed amount off the items subtotal.
    Fixed(Money),
}

/// A discount code with a bounded usage allowance.
///
/// Redemption is a one-way transition: the redeemed count only grows, and
/// it is incremented exactly once per completed checkout, after payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    id: CouponId,
    code: String,
    discount: Discount,
    usage_limit: Option<u32>,
    times_redeemed: u32,
}

impl Coupon {
    /// Creates a new coupon with no usage limit.
    pub fn new(code: impl Into<String>, discount: Discount) -> Self {
        Self {
            id: CouponId::new(),
            code: code.into(),
            discount,
            usage_limit: None,
            times_redeemed: 0,
        }
    }

    /// Bounds how many times the coupon can be redeemed.
    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Returns the coupon ID.
    pub fn id(&self) -> CouponId {
        self.id
    }

    /// Returns the coupon code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the discount.
    pub fn discount(&self) -> Discount {
        self.discount
    }

    /// Returns how many times the coupon has been redeemed.
    pub fn times_redeemed(&self) -> u32 {
        self.times_redeemed
    }

    /// Returns true if the coupon can still be redeemed.
    pub fn is_redeemable(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.times_redeemed < limit,
            None => true,
        }
    }

    /// Returns the discount this coupon takes off the given subtotal.
    pub fn discount_on(&self, subtotal: Money) -> Money {
        match self.discount {
            Discount::Percentage(percent) => subtotal.percentage(percent),
            Discount::Fixed(amount) => amount,
        }
    }

    /// Consumes one use of the coupon's allowance.
    pub fn redeem(&mut self) -> Result<(), CouponError> {
        if !self.is_redeemable() {
            return Err(CouponError::LimitReached {
                code: self.code.clone(),
            });
        }

        self.times_redeemed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_discount() {
        let coupon = Coupon::new("SAVE10", Discount::Percentage(10));
        assert_eq!(coupon.discount_on(Money::from_cents(10_000)).cents(), 1000);
    }

    #[test]
    fn fixed_discount_ignores_subtotal() {
        let coupon = Coupon::new("FIVER", Discount::Fixed(Money::from_cents(500)));
        assert_eq!(coupon.discount_on(Money::from_cents(100)).cents(), 500);
    }

    #[test]
    fn redeem_increments_counter() {
        let mut coupon = Coupon::new("SAVE10", Discount::Percentage(10));
        coupon.redeem().unwrap();
        coupon.redeem().unwrap();
        assert_eq!(coupon.times_redeemed(), 2);
    }

    #[test]
    fn redeem_respects_usage_limit() {
        let mut coupon = Coupon::new("ONCE", Discount::Percentage(10)).with_usage_limit(1);
        assert!(coupon.is_redeemable());
        coupon.redeem().unwrap();
        assert!(!coupon.is_redeemable());
        assert!(matches!(
            coupon.redeem(),
            Err(CouponError::LimitReached { .. })
        ));
        assert_eq!(coupon.times_redeemed(), 1);
    }

    #[test]
    fn serialization_round_trip() {
        let coupon = Coupon::new("SAVE10", Discount::Percentage(10)).with_usage_limit(5);
        let json = serde_json::to_string(&coupon).unwrap();
        let back: Coupon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coupon);
    }
}

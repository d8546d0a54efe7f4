//! Domain layer for the commerce core.
//!
//! This crate provides the mutable records the checkout pipeline operates
//! on:
//! - the [`Order`] aggregate (a cart is an order that has not completed
//!   checkout), its line items and recomputable totals
//! - the [`Customer`] record with its in-band order history
//! - the [`Coupon`] record with its one-way redemption counter

pub mod coupon;
pub mod customer;
pub mod error;
pub mod order;

pub use coupon::{Coupon, CouponError, CouponId, Discount};
pub use customer::{Customer, CustomerId};
pub use error::DomainError;
pub use order::{LineItem, LineItemId, Money, Order, OrderError, PaymentStatus, ProductId};

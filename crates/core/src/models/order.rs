//! Carts, order lines and orders.
//!
//! A user has at most one open cart: an [`Order`] whose `ordered` flag is
//! false. Each product in it is an [`OrderItem`] (a quantity of one
//! [`Item`]). Pricing needs the item alongside the line, so the helpers live
//! on [`CartLine`] and [`OrderSummary`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::billing::Coupon;
use super::item::Item;
use super::user::User;
use crate::types::{
    BillingAddressId, CouponId, ItemId, LifecycleError, Money, OrderFlags, OrderId, OrderItemId,
    OrderStage, PaymentId, RefCode, UserId,
};

/// A quantity of one item in a user's cart or placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub user_id: UserId,
    pub item_id: ItemId,
    /// Always at least 1; a line that would drop to 0 is removed instead.
    pub quantity: u32,
    pub ordered: bool,
}

/// An order line joined with its item, which is what prices are computed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub order_item: OrderItem,
    pub item: Item,
}

impl CartLine {
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.order_item.quantity
    }

    /// `quantity × price`.
    #[must_use]
    pub fn total_item_price(&self) -> Money {
        self.item.price.times(self.quantity())
    }

    /// `quantity × discount_price`, or `None` when the item is not on sale.
    #[must_use]
    pub fn total_discount_item_price(&self) -> Option<Money> {
        self.item
            .effective_discount()
            .map(|d| d.times(self.quantity()))
    }

    /// How much the discount saves on this line (zero without a discount).
    #[must_use]
    pub fn amount_saved(&self) -> Money {
        self.total_discount_item_price()
            .map_or(Money::ZERO, |discounted| {
                self.total_item_price() - discounted
            })
    }

    /// What the customer pays for this line.
    #[must_use]
    pub fn final_price(&self) -> Money {
        self.total_discount_item_price()
            .unwrap_or_else(|| self.total_item_price())
    }
}

impl std::fmt::Display for CartLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.quantity(), self.item.title)
    }
}

/// A user's cart, or a placed order once `flags.ordered` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Assigned when the order is placed.
    pub ref_code: Option<RefCode>,
    pub start_date: DateTime<Utc>,
    pub ordered_date: Option<DateTime<Utc>>,
    pub flags: OrderFlags,
    pub billing_address_id: Option<BillingAddressId>,
    pub payment_id: Option<PaymentId>,
    pub coupon_id: Option<CouponId>,
}

impl Order {
    #[must_use]
    pub const fn stage(&self) -> OrderStage {
        self.flags.stage()
    }

    #[must_use]
    pub const fn is_cart(&self) -> bool {
        !self.flags.ordered
    }

    /// Turn the cart into a placed order.
    ///
    /// Requires at least one line and a billing address. Sets the payment,
    /// reference code and ordered date.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] if the cart is already ordered, empty, or
    /// has no billing address.
    pub fn place(
        &mut self,
        line_count: usize,
        payment_id: PaymentId,
        ref_code: RefCode,
        at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if self.flags.ordered {
            return Err(LifecycleError::AlreadyOrdered);
        }
        if line_count == 0 {
            return Err(LifecycleError::EmptyCart);
        }
        if self.billing_address_id.is_none() {
            return Err(LifecycleError::MissingBillingAddress);
        }
        self.flags.place()?;
        self.payment_id = Some(payment_id);
        self.ref_code = Some(ref_code);
        self.ordered_date = Some(at);
        Ok(())
    }
}

/// An order paired with its owner; displays as the owner's username.
#[derive(Debug, Clone, Copy)]
pub struct OrderView<'a> {
    pub order: &'a Order,
    pub owner: &'a User,
}

impl std::fmt::Display for OrderView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.owner.username)
    }
}

/// An order together with its lines and applied coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order: Order,
    pub lines: Vec<CartLine>,
    pub coupon: Option<Coupon>,
}

impl OrderSummary {
    /// Sum of every line's final price, before the coupon.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::final_price).sum()
    }

    /// Coupon amount taken off the subtotal.
    #[must_use]
    pub fn coupon_discount(&self) -> Money {
        self.coupon.as_ref().map_or(Money::ZERO, |c| c.amount)
    }

    /// Subtotal minus the coupon. May be negative when the coupon is worth
    /// more than the cart.
    #[must_use]
    pub fn total(&self) -> Money {
        self.subtotal() - self.coupon_discount()
    }

    /// What a payment is recorded for: the total, never below zero.
    #[must_use]
    pub fn amount_due(&self) -> Money {
        self.total().max_zero()
    }

    /// Total saved through item discounts (coupon excluded).
    #[must_use]
    pub fn amount_saved(&self) -> Money {
        self.lines.iter().map(CartLine::amount_saved).sum()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(CartLine::quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

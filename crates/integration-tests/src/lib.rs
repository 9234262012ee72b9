//! Integration tests for Outfitter.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p outfitter-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `pricing` - Line, subtotal, coupon and amount-due arithmetic
//! - `lifecycle` - Placing orders and the guarded flag transitions
//! - `urls` - Named route reversal against the registered router
//! - `wire_format` - JSON shapes of core types
//! - `router` - Requests through the storefront router that stop before the database
//! - `repositories` - Cart, checkout, refund and deletion queries against `PostgreSQL`
//!
//! Only `repositories` needs a running database; its tests are `#[ignore]`d
//! and read `DATABASE_URL`:
//!
//! ```bash
//! cargo test -p outfitter-integration-tests --test repositories -- --ignored
//! ```
//!
//! This library holds the fixture builders they share.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use outfitter_core::{
    BillingAddressId, CartLine, Category, Coupon, CouponId, Item, ItemId, Label, Money, Order,
    OrderFlags, OrderId, OrderItem, OrderItemId, OrderSummary, Slug, UserId,
};

/// Parse a money literal.
#[must_use]
pub fn money(amount: &str) -> Money {
    amount.parse().unwrap()
}

/// An item with the given prices.
#[must_use]
pub fn item(id: i32, title: &str, price: &str, discount: Option<&str>) -> Item {
    Item {
        id: ItemId::new(id),
        title: title.to_owned(),
        price: money(price),
        discount_price: discount.map(money),
        category: Category::Shirt,
        label: Label::Primary,
        slug: Slug::from_title(title).unwrap(),
        description: String::new(),
        image: String::new(),
    }
}

/// A cart line for `quantity` units of `item`.
#[must_use]
pub fn line(item: Item, quantity: u32) -> CartLine {
    CartLine {
        order_item: OrderItem {
            id: OrderItemId::new(item.id.as_i32()),
            user_id: UserId::new(1),
            item_id: item.id,
            quantity,
            ordered: false,
        },
        item,
    }
}

/// An open cart owned by user 1.
#[must_use]
pub fn cart() -> Order {
    Order {
        id: OrderId::new(1),
        user_id: UserId::new(1),
        ref_code: None,
        start_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ordered_date: None,
        flags: OrderFlags::default(),
        billing_address_id: None,
        payment_id: None,
        coupon_id: None,
    }
}

/// An open cart that already has a billing address.
#[must_use]
pub fn addressed_cart() -> Order {
    Order {
        billing_address_id: Some(BillingAddressId::new(1)),
        ..cart()
    }
}

/// A fixed-amount coupon.
#[must_use]
pub fn coupon(code: &str, amount: &str) -> Coupon {
    Coupon {
        id: CouponId::new(1),
        code: code.to_owned(),
        amount: money(amount),
    }
}

/// Summary of an open cart with the given lines and coupon.
#[must_use]
pub fn summary(lines: Vec<CartLine>, coupon: Option<Coupon>) -> OrderSummary {
    OrderSummary {
        order: Order {
            coupon_id: coupon.as_ref().map(|c| c.id),
            ..cart()
        },
        lines,
        coupon,
    }
}

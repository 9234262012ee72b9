//! Storefront entities.
//!
//! These are validated domain objects, separate from database row types.
//! Derived values (line totals, savings, order totals) are computed here so
//! the storefront and CLI agree on them.

pub mod billing;
pub mod item;
pub mod order;
pub mod user;

pub use billing::{
    BillingAddress, Coupon, MAX_ADDRESS_FIELD_LENGTH, MAX_CHARGE_ID_LENGTH, MAX_COUPON_CODE_LENGTH,
    NewBillingAddress, Payment, Refund,
};
pub use item::{Item, ItemError, MAX_TITLE_LENGTH, NewItem};
pub use order::{CartLine, Order, OrderItem, OrderSummary, OrderView};
pub use user::{OwnerName, User};

//! Cart route handlers.
//!
//! Every cart operation acts on the logged-in user's open order. Responses
//! carry a customer-facing message and the URL the client should show next.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use outfitter_core::{CartLine, Money, OrderStage, OrderSummary, RefCode, Slug};

use super::products::find_item;
use crate::db::carts::CartChange;
use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireUser;
use crate::state::AppState;
use crate::urls::{self, Route};

/// Message shown when a cart operation needs an open order.
pub(crate) const NO_ACTIVE_ORDER: &str = "You do not have an active order";

/// Map the repository's missing-cart error to a customer-facing 404.
pub(crate) fn no_active_order(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(NO_ACTIVE_ORDER.to_owned()),
        other => AppError::Database(other),
    }
}

/// One line of an order as shown to customers.
#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub slug: Slug,
    pub title: String,
    pub quantity: u32,
    pub description: String,
    pub total_item_price: Money,
    pub total_discount_item_price: Option<Money>,
    pub amount_saved: Money,
    pub final_price: Money,
    pub display_final_price: String,
}

impl LineView {
    fn new(line: &CartLine, currency_symbol: &str) -> Self {
        Self {
            slug: line.item.slug.clone(),
            title: line.item.title.clone(),
            quantity: line.quantity(),
            description: line.to_string(),
            total_item_price: line.total_item_price(),
            total_discount_item_price: line.total_discount_item_price(),
            amount_saved: line.amount_saved(),
            final_price: line.final_price(),
            display_final_price: line.final_price().display_with(currency_symbol),
        }
    }
}

/// Coupon as shown on a summary.
#[derive(Debug, Clone, Serialize)]
pub struct CouponView {
    pub code: String,
    pub amount: Money,
}

/// An order with its lines and totals.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub ref_code: Option<RefCode>,
    pub stage: OrderStage,
    pub lines: Vec<LineView>,
    pub coupon: Option<CouponView>,
    pub has_billing_address: bool,
    pub subtotal: Money,
    pub coupon_discount: Money,
    /// May be negative when the coupon exceeds the subtotal.
    pub total: Money,
    pub amount_due: Money,
    pub display_amount_due: String,
    pub amount_saved: Money,
    pub item_count: u32,
}

impl SummaryView {
    #[must_use]
    pub fn new(summary: &OrderSummary, currency_symbol: &str) -> Self {
        Self {
            ref_code: summary.order.ref_code.clone(),
            stage: summary.order.stage(),
            lines: summary
                .lines
                .iter()
                .map(|line| LineView::new(line, currency_symbol))
                .collect(),
            coupon: summary.coupon.as_ref().map(|c| CouponView {
                code: c.code.clone(),
                amount: c.amount,
            }),
            has_billing_address: summary.order.billing_address_id.is_some(),
            subtotal: summary.subtotal(),
            coupon_discount: summary.coupon_discount(),
            total: summary.total(),
            amount_due: summary.amount_due(),
            display_amount_due: summary.amount_due().display_with(currency_symbol),
            amount_saved: summary.amount_saved(),
            item_count: summary.item_count(),
        }
    }
}

/// Result of a cart operation.
#[derive(Debug, Serialize)]
pub struct CartActionResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub change: CartChange,
    /// Where the client should go next.
    pub next: String,
}

impl CartActionResponse {
    fn new(change: CartChange, slug: &Slug) -> Self {
        let (message, next) = match change {
            CartChange::Added => (
                "This item was added to your cart.",
                urls::reverse(Route::OrderSummary),
            ),
            CartChange::Incremented { .. } | CartChange::Decremented { .. } => (
                "This item quantity was updated.",
                urls::reverse(Route::OrderSummary),
            ),
            CartChange::Removed => (
                "This item was removed from your cart.",
                urls::reverse(Route::OrderSummary),
            ),
            CartChange::NotInCart => (
                "This item was not in your cart.",
                urls::reverse(Route::Product(slug)),
            ),
        };
        Self {
            message,
            change,
            next,
        }
    }
}

/// Add one unit of an item to the cart.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<CartActionResponse>> {
    let item = find_item(&state, &slug).await?;
    let change = CartRepository::new(state.pool())
        .add_item(user.id, item.id)
        .await?;

    add_breadcrumb("cart", "Added item", Some(&[("slug", item.slug.as_str())]));
    Ok(Json(CartActionResponse::new(change, &item.slug)))
}

/// Remove an item's line from the cart.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<CartActionResponse>> {
    let item = find_item(&state, &slug).await?;
    let change = CartRepository::new(state.pool())
        .remove_item(user.id, item.id)
        .await
        .map_err(no_active_order)?;

    Ok(Json(CartActionResponse::new(change, &item.slug)))
}

/// Remove one unit of an item from the cart.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn remove_single(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<CartActionResponse>> {
    let item = find_item(&state, &slug).await?;
    let change = CartRepository::new(state.pool())
        .remove_single_item(user.id, item.id)
        .await
        .map_err(no_active_order)?;

    Ok(Json(CartActionResponse::new(change, &item.slug)))
}

/// Show the open cart with totals.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn order_summary(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<SummaryView>> {
    let summary = CartRepository::new(state.pool())
        .summary(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ACTIVE_ORDER.to_owned()))?;

    Ok(Json(SummaryView::new(
        &summary,
        &state.config().currency_symbol,
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use outfitter_core::{
        Category, Coupon, CouponId, Item, ItemId, Label, Order, OrderFlags, OrderId, OrderItem,
        OrderItemId, UserId,
    };

    fn summary() -> OrderSummary {
        let item = Item {
            id: ItemId::new(1),
            title: "Fleece".to_owned(),
            price: "40.00".parse().unwrap(),
            discount_price: Some("35.00".parse().unwrap()),
            category: Category::Outwear,
            label: Label::Primary,
            slug: Slug::parse("fleece").unwrap(),
            description: String::new(),
            image: String::new(),
        };
        OrderSummary {
            order: Order {
                id: OrderId::new(1),
                user_id: UserId::new(1),
                ref_code: None,
                start_date: Utc::now(),
                ordered_date: None,
                flags: OrderFlags::default(),
                billing_address_id: None,
                payment_id: None,
                coupon_id: Some(CouponId::new(1)),
            },
            lines: vec![CartLine {
                order_item: OrderItem {
                    id: OrderItemId::new(1),
                    user_id: UserId::new(1),
                    item_id: item.id,
                    quantity: 2,
                    ordered: false,
                },
                item,
            }],
            coupon: Some(Coupon {
                id: CouponId::new(1),
                code: "TENOFF".to_owned(),
                amount: "10.00".parse().unwrap(),
            }),
        }
    }

    #[test]
    fn test_summary_view_totals() {
        let view = SummaryView::new(&summary(), "$");
        assert_eq!(view.subtotal, "70.00".parse().unwrap());
        assert_eq!(view.total, "60.00".parse().unwrap());
        assert_eq!(view.amount_saved, "10.00".parse().unwrap());
        assert_eq!(view.display_amount_due, "$60.00");
        assert_eq!(view.item_count, 2);
        assert_eq!(view.lines[0].description, "2 of Fleece");
        assert_eq!(view.stage, OrderStage::Cart);
        assert!(!view.has_billing_address);
    }

    #[test]
    fn test_cart_action_messages() {
        let slug = Slug::parse("fleece").unwrap();
        let added = CartActionResponse::new(CartChange::Added, &slug);
        assert_eq!(added.next, "/order-summary");

        let missing = CartActionResponse::new(CartChange::NotInCart, &slug);
        assert_eq!(missing.next, "/product/fleece");

        let json = serde_json::to_value(&added).unwrap();
        assert_eq!(json["change"], "added");
        assert_eq!(json["message"], "This item was added to your cart.");
    }

    #[test]
    fn test_no_active_order_mapping() {
        let err = no_active_order(RepositoryError::NotFound);
        assert!(matches!(err, AppError::NotFound(msg) if msg == NO_ACTIVE_ORDER));
    }
}

//! Checkout, coupon and payment route handlers.
//!
//! The flow is: attach a billing address (`/checkout`), optionally apply a
//! coupon (`/add-coupon`), then record the payment and place the order
//! (`/payment`). The charge itself happens client-side with the payment
//! gateway; only its charge id reaches us.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use outfitter_core::{
    BillingAddress, CountryCode, Money, NewBillingAddress, PaymentId, RefCode,
};

use super::cart::{NO_ACTIVE_ORDER, SummaryView, no_active_order};
use crate::db::{CartRepository, CouponRepository, OrderRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireUser;
use crate::state::AppState;
use crate::urls::{self, Route};

/// A selectable country.
#[derive(Debug, Serialize)]
pub struct CountryOption {
    pub code: CountryCode,
    pub name: &'static str,
}

/// Data for the checkout form.
#[derive(Debug, Serialize)]
pub struct CheckoutPage {
    pub order: SummaryView,
    pub countries: Vec<CountryOption>,
}

/// Response after saving a billing address.
#[derive(Debug, Serialize)]
pub struct AddressSaved {
    pub address: BillingAddress,
    pub next: String,
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
}

/// Response after applying a coupon.
#[derive(Debug, Serialize)]
pub struct CouponApplied {
    pub message: &'static str,
    pub order: SummaryView,
}

/// Payment form data.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    /// Charge id returned by the payment gateway.
    #[serde(alias = "stripeToken")]
    pub stripe_charge_id: String,
}

/// Payment receipt.
#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
}

/// Response after placing an order.
#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub message: &'static str,
    pub ref_code: Option<RefCode>,
    pub payment: PaymentView,
    pub order: SummaryView,
    pub next: String,
}

/// Show the open cart with the country list for the address form.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn checkout_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CheckoutPage>> {
    let summary = CartRepository::new(state.pool())
        .summary(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ACTIVE_ORDER.to_owned()))?;

    Ok(Json(CheckoutPage {
        order: SummaryView::new(&summary, &state.config().currency_symbol),
        countries: CountryCode::all()
            .map(|(code, name)| CountryOption { code, name })
            .collect(),
    }))
}

/// Save a billing address and attach it to the open cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<NewBillingAddress>,
) -> Result<(StatusCode, Json<AddressSaved>)> {
    let address = CartRepository::new(state.pool())
        .set_billing_address(user.id, form)
        .await
        .map_err(no_active_order)?;

    Ok((
        StatusCode::CREATED,
        Json(AddressSaved {
            address,
            next: urls::reverse(Route::Payment),
        }),
    ))
}

/// Apply a coupon code to the open cart.
#[instrument(skip_all, fields(user_id = %user.id, code = %form.code))]
pub async fn add_coupon(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<CouponForm>,
) -> Result<Json<CouponApplied>> {
    let carts = CartRepository::new(state.pool());
    if carts.open_cart(user.id).await?.is_none() {
        return Err(AppError::NotFound(NO_ACTIVE_ORDER.to_owned()));
    }

    let coupon = CouponRepository::new(state.pool())
        .get_by_code(&form.code)
        .await?
        .ok_or_else(|| AppError::NotFound("This coupon does not exist".to_owned()))?;

    let summary = carts
        .apply_coupon(user.id, &coupon)
        .await
        .map_err(no_active_order)?;

    Ok(Json(CouponApplied {
        message: "Successfully added coupon",
        order: SummaryView::new(&summary, &state.config().currency_symbol),
    }))
}

/// Show what is about to be paid for.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn payment_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<SummaryView>> {
    let summary = CartRepository::new(state.pool())
        .summary(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ACTIVE_ORDER.to_owned()))?;

    if summary.order.billing_address_id.is_none() {
        return Err(AppError::BadRequest(
            "You have not added a billing address".to_owned(),
        ));
    }

    Ok(Json(SummaryView::new(
        &summary,
        &state.config().currency_symbol,
    )))
}

/// Record the payment and place the order.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn payment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<PaymentForm>,
) -> Result<(StatusCode, Json<OrderPlaced>)> {
    let (summary, payment) = OrderRepository::new(state.pool())
        .place_order(user.id, &form.stripe_charge_id)
        .await
        .map_err(no_active_order)?;

    add_breadcrumb("checkout", "Order placed", None);

    Ok((
        StatusCode::CREATED,
        Json(OrderPlaced {
            message: "Your order was successful!",
            ref_code: summary.order.ref_code.clone(),
            payment: PaymentView {
                id: payment.id,
                amount: payment.amount,
                timestamp: payment.timestamp,
            },
            order: SummaryView::new(&summary, &state.config().currency_symbol),
            next: urls::reverse(Route::Home),
        }),
    ))
}

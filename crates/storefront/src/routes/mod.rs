//! HTTP route handlers for storefront.
//!
//! All handlers speak JSON.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Catalog (paginated)
//! GET  /product/{slug}                - Item detail
//!
//! # Cart (requires auth)
//! POST /add-to-cart/{slug}            - Add one unit
//! POST /remove-from-cart/{slug}       - Delete the item's line
//! POST /remove-item-from-cart/{slug}  - Remove one unit
//! GET  /order-summary                 - Open cart with totals
//!
//! # Checkout (requires auth)
//! GET  /checkout                      - Cart + country list
//! POST /checkout                      - Attach billing address
//! POST /add-coupon                    - Apply coupon code
//! GET  /payment                       - Amount due
//! POST /payment                       - Record payment, place order
//!
//! # Refunds
//! POST /request-refund                - Request a refund by reference code
//!
//! # Auth
//! POST /auth/register                 - Create account and log in
//! POST /auth/login                    - Log in
//! POST /auth/logout                   - Log out
//! GET  /auth/me                       - Current user
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
pub mod refunds;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use crate::urls;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route(urls::HOME, get(products::index))
        .route(urls::PRODUCT, get(products::show))
        // Cart
        .route(urls::ADD_TO_CART, post(cart::add))
        .route(urls::REMOVE_FROM_CART, post(cart::remove))
        .route(urls::REMOVE_SINGLE_ITEM_FROM_CART, post(cart::remove_single))
        .route(urls::ORDER_SUMMARY, get(cart::order_summary))
        // Checkout
        .route(
            urls::CHECKOUT,
            get(checkout::checkout_page).post(checkout::checkout),
        )
        .route(urls::ADD_COUPON, post(checkout::add_coupon))
        .route(
            urls::PAYMENT,
            get(checkout::payment_page).post(checkout::payment),
        )
        // Refunds
        .route(urls::REQUEST_REFUND, post(refunds::request_refund))
        // Auth
        .nest("/auth", auth_routes())
}

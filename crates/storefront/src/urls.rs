//! Named routes and URL reversal.
//!
//! Every storefront page has a stable name (`product`, `add-to-cart`, ...)
//! so links can be built without hard-coding paths. The router registers
//! the same patterns defined here.

use url::Url;

use outfitter_core::{Item, Slug};

pub const HOME: &str = "/";
pub const PRODUCT: &str = "/product/{slug}";
pub const ADD_TO_CART: &str = "/add-to-cart/{slug}";
pub const REMOVE_FROM_CART: &str = "/remove-from-cart/{slug}";
pub const REMOVE_SINGLE_ITEM_FROM_CART: &str = "/remove-item-from-cart/{slug}";
pub const ORDER_SUMMARY: &str = "/order-summary";
pub const CHECKOUT: &str = "/checkout";
pub const ADD_COUPON: &str = "/add-coupon";
pub const PAYMENT: &str = "/payment";
pub const REQUEST_REFUND: &str = "/request-refund";

/// A named storefront route with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    Product(&'a Slug),
    AddToCart(&'a Slug),
    RemoveFromCart(&'a Slug),
    RemoveSingleItemFromCart(&'a Slug),
    OrderSummary,
    Checkout,
    AddCoupon,
    Payment,
    RequestRefund,
}

impl Route<'_> {
    /// The route's stable name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Product(_) => "product",
            Self::AddToCart(_) => "add-to-cart",
            Self::RemoveFromCart(_) => "remove-from-cart",
            Self::RemoveSingleItemFromCart(_) => "remove-single-item-from-cart",
            Self::OrderSummary => "order-summary",
            Self::Checkout => "checkout",
            Self::AddCoupon => "add-coupon",
            Self::Payment => "payment",
            Self::RequestRefund => "request-refund",
        }
    }

    /// The path pattern the router registers for this route.
    #[must_use]
    pub const fn pattern(&self) -> &'static str {
        match self {
            Self::Home => HOME,
            Self::Product(_) => PRODUCT,
            Self::AddToCart(_) => ADD_TO_CART,
            Self::RemoveFromCart(_) => REMOVE_FROM_CART,
            Self::RemoveSingleItemFromCart(_) => REMOVE_SINGLE_ITEM_FROM_CART,
            Self::OrderSummary => ORDER_SUMMARY,
            Self::Checkout => CHECKOUT,
            Self::AddCoupon => ADD_COUPON,
            Self::Payment => PAYMENT,
            Self::RequestRefund => REQUEST_REFUND,
        }
    }

    const fn slug(&self) -> Option<&Slug> {
        match self {
            Self::Product(slug)
            | Self::AddToCart(slug)
            | Self::RemoveFromCart(slug)
            | Self::RemoveSingleItemFromCart(slug) => Some(*slug),
            _ => None,
        }
    }
}

/// Build the path for a route.
///
/// Slugs only contain URL-safe characters, so no escaping is needed.
#[must_use]
pub fn reverse(route: Route<'_>) -> String {
    let pattern = route.pattern();
    match route.slug() {
        Some(slug) => pattern.replace("{slug}", slug.as_str()),
        None => pattern.to_owned(),
    }
}

/// Make the base URL's path end in `/` so joining keeps its last segment.
#[must_use]
pub fn with_trailing_slash(mut base_url: Url) -> Url {
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url
}

/// Build the full URL for a route under the site's base URL.
///
/// A base URL with a path prefix (`https://example.com/shop`) keeps it,
/// with or without the trailing slash.
///
/// # Errors
///
/// Returns `url::ParseError` if the base URL cannot be joined.
pub fn absolute(base_url: &Url, route: Route<'_>) -> Result<Url, url::ParseError> {
    let path = reverse(route);
    let path = path.trim_start_matches('/');
    if base_url.path().ends_with('/') {
        base_url.join(path)
    } else {
        with_trailing_slash(base_url.clone()).join(path)
    }
}

/// Link helpers for catalog items.
pub trait ItemUrls {
    /// Product detail page.
    fn absolute_url(&self) -> String;
    /// Add one unit to the cart.
    fn add_to_cart_url(&self) -> String;
    /// Remove the item's line from the cart.
    fn remove_from_cart_url(&self) -> String;
}

impl ItemUrls for Item {
    fn absolute_url(&self) -> String {
        reverse(Route::Product(&self.slug))
    }

    fn add_to_cart_url(&self) -> String {
        reverse(Route::AddToCart(&self.slug))
    }

    fn remove_from_cart_url(&self) -> String {
        reverse(Route::RemoveFromCart(&self.slug))
    }
}

//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Database: `outfitter`
//!
//! ## Tables (schema `storefront`)
//!
//! - `user`, `user_password` - Shopper accounts
//! - `item` - Catalog
//! - `coupon` - Fixed-amount discount codes
//! - `order_item` - A quantity of one item, owned by a user
//! - `order` - Carts and placed orders (lifecycle flags)
//! - `order_order_item` - Order ↔ order item link
//! - `billing_address`, `payment`, `refund`
//!
//! Sessions live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p outfitter-cli -- migrate
//! ```

pub mod addresses;
pub mod carts;
pub mod coupons;
pub mod items;
pub mod orders;
pub mod payments;
pub mod refunds;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use outfitter_core::LifecycleError;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
pub use coupons::CouponRepository;
pub use items::ItemRepository;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use refunds::RefundRepository;
pub use users::UserRepository;

/// Embedded migrations from `crates/storefront/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input rejected before it reached the database.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// The operation is not allowed in the order's current state.
    #[error("invalid order state: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Decode a stored column value through its domain parser.
pub(crate) fn decode_column<T, E: std::fmt::Display>(
    column: &str,
    parsed: Result<T, E>,
) -> Result<T, RepositoryError> {
    parsed.map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

/// Convert a stored quantity, which the schema keeps at 1 or more.
pub(crate) fn decode_quantity(quantity: i32) -> Result<u32, RepositoryError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| RepositoryError::DataCorruption(format!("invalid quantity {quantity}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_quantity() {
        assert_eq!(decode_quantity(3).ok(), Some(3));
        assert!(matches!(
            decode_quantity(0),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(decode_quantity(-2).is_err());
    }

    #[test]
    fn test_decode_column_wraps_parse_error() {
        let parsed = outfitter_core::Slug::parse("bad slug");
        let err = decode_column("slug", parsed).err();
        assert!(
            matches!(err, Some(RepositoryError::DataCorruption(msg)) if msg.starts_with("invalid slug"))
        );
    }

    #[test]
    fn test_lifecycle_error_converts() {
        let err: RepositoryError = LifecycleError::EmptyCart.into();
        assert_eq!(err.to_string(), "invalid order state: cart is empty");
    }
}

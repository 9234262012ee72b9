//! Payment repository.
//!
//! Payments are written only while placing an order (see
//! [`super::OrderRepository::place_order`]); this module reads them back.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use outfitter_core::{MAX_CHARGE_ID_LENGTH, Money, Payment, PaymentId, UserId};

use super::RepositoryError;

const PAYMENT_COLUMNS: &str = "id, stripe_charge_id, user_id, amount, timestamp";

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    stripe_charge_id: String,
    user_id: Option<i32>,
    amount: Money,
    timestamp: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: PaymentId::new(row.id),
            stripe_charge_id: row.stripe_charge_id,
            user_id: row.user_id.map(UserId::new),
            amount: row.amount,
            timestamp: row.timestamp,
        }
    }
}

/// Trim a processor charge id and check it fits the column.
fn normalize_charge_id(stripe_charge_id: &str) -> Result<&str, RepositoryError> {
    let charge_id = stripe_charge_id.trim();
    if charge_id.is_empty() || charge_id.chars().count() > MAX_CHARGE_ID_LENGTH {
        return Err(RepositoryError::Invalid(format!(
            "charge id must be 1 to {MAX_CHARGE_ID_LENGTH} characters"
        )));
    }
    Ok(charge_id)
}

/// Record a charge inside an open transaction.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    stripe_charge_id: &str,
    user_id: UserId,
    amount: Money,
    at: DateTime<Utc>,
) -> Result<Payment, RepositoryError> {
    let charge_id = normalize_charge_id(stripe_charge_id)?;

    let row = sqlx::query_as::<_, PaymentRow>(&format!(
        r"
        INSERT INTO storefront.payment (stripe_charge_id, user_id, amount, timestamp)
        VALUES ($1, $2, $3, $4)
        RETURNING {PAYMENT_COLUMNS}
        "
    ))
    .bind(charge_id)
    .bind(user_id)
    .bind(amount)
    .bind(at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Payment::from(row))
}

/// Repository for payment lookups.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM storefront.payment WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Payment::from))
    }
}

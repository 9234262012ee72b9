//! Coupon repository.

use sqlx::PgPool;

use outfitter_core::{Coupon, CouponId, MAX_COUPON_CODE_LENGTH, Money};

use super::{RepositoryError, conflict_on_unique};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CouponRow {
    id: i32,
    code: String,
    amount: Money,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Self {
            id: CouponId::new(row.id),
            code: row.code,
            amount: row.amount,
        }
    }
}

/// Repository for coupon codes.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a coupon by the code a customer typed.
    ///
    /// The code is normalized before matching.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(
            "SELECT id, code, amount FROM storefront.coupon WHERE code = $1",
        )
        .bind(Coupon::normalize_code(code))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Coupon::from))
    }

    /// List all coupons by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRow>(
            "SELECT id, code, amount FROM storefront.coupon ORDER BY code",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Coupon::from).collect())
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the code is empty or too long or
    /// the amount is negative, and `RepositoryError::Conflict` if the code
    /// already exists.
    pub async fn create(&self, code: &str, amount: Money) -> Result<Coupon, RepositoryError> {
        let code = Coupon::normalize_code(code);
        if code.is_empty() || code.chars().count() > MAX_COUPON_CODE_LENGTH {
            return Err(RepositoryError::Invalid(format!(
                "coupon code must be 1 to {MAX_COUPON_CODE_LENGTH} characters"
            )));
        }
        if amount.is_negative() {
            return Err(RepositoryError::Invalid(
                "coupon amount cannot be negative".to_owned(),
            ));
        }

        let row = sqlx::query_as::<_, CouponRow>(
            r"
            INSERT INTO storefront.coupon (code, amount)
            VALUES ($1, $2)
            RETURNING id, code, amount
            ",
        )
        .bind(&code)
        .bind(amount)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "coupon code"))?;

        tracing::info!(code = %code, amount = %amount, "coupon created");
        Ok(Coupon::from(row))
    }
}

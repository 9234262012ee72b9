//! Refund repository.

use sqlx::PgPool;

use outfitter_core::{Email, LifecycleError, OrderId, RefCode, Refund, RefundId};

use super::orders::{lock_by_ref_code, save_flags};
use super::{RepositoryError, decode_column};

const REFUND_COLUMNS: &str = "id, order_id, reason, accepted, email";

#[derive(Debug, sqlx::FromRow)]
struct RefundRow {
    id: i32,
    order_id: i32,
    reason: String,
    accepted: bool,
    email: String,
}

impl TryFrom<RefundRow> for Refund {
    type Error = RepositoryError;

    fn try_from(row: RefundRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RefundId::new(row.id),
            order_id: OrderId::new(row.order_id),
            reason: row.reason,
            accepted: row.accepted,
            email: decode_column("email", Email::parse(&row.email))?,
        })
    }
}

/// Repository for refund requests.
pub struct RefundRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RefundRepository<'a> {
    /// Create a new refund repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// File a refund request against a placed order.
    ///
    /// Flags the order as `refund_requested` and records the reason and
    /// contact email in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown reference code and
    /// `RepositoryError::Lifecycle` if the order isn't placed or already has
    /// a refund request. An empty reason is `RepositoryError::Invalid`.
    pub async fn request(
        &self,
        ref_code: &RefCode,
        reason: &str,
        email: &Email,
    ) -> Result<Refund, RepositoryError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RepositoryError::Invalid("reason is required".to_owned()));
        }

        let mut tx = self.pool.begin().await?;
        let mut order = lock_by_ref_code(&mut tx, ref_code).await?;
        order.flags.request_refund()?;
        save_flags(&mut tx, order.id, order.flags).await?;

        let row = sqlx::query_as::<_, RefundRow>(&format!(
            r"
            INSERT INTO storefront.refund (order_id, reason, accepted, email)
            VALUES ($1, $2, FALSE, $3)
            RETURNING {REFUND_COLUMNS}
            "
        ))
        .bind(order.id)
        .bind(reason)
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let refund = Refund::try_from(row)?;
        tracing::info!(refund_id = %refund.id, order_id = %order.id, "refund requested");
        Ok(refund)
    }

    /// Accept a refund request and grant the refund on its order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown refund and
    /// `RepositoryError::Lifecycle` if it was already accepted.
    pub async fn accept(&self, id: RefundId) -> Result<Refund, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RefundRow>(&format!(
            "SELECT {REFUND_COLUMNS} FROM storefront.refund WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let mut refund = Refund::try_from(row)?;
        if refund.accepted {
            return Err(LifecycleError::RefundAlreadyGranted.into());
        }

        let ref_code: Option<String> =
            sqlx::query_scalar("SELECT ref_code FROM storefront.order WHERE id = $1")
                .bind(refund.order_id)
                .fetch_one(&mut *tx)
                .await?;
        let ref_code = ref_code
            .ok_or_else(|| RepositoryError::DataCorruption("refunded order has no ref_code".to_owned()))?;
        let ref_code = decode_column("ref_code", RefCode::parse(&ref_code))?;

        let mut order = lock_by_ref_code(&mut tx, &ref_code).await?;
        order.flags.grant_refund()?;
        save_flags(&mut tx, order.id, order.flags).await?;

        sqlx::query("UPDATE storefront.refund SET accepted = TRUE WHERE id = $1")
            .bind(refund.id)
            .execute(&mut *tx)
            .await?;
        refund.accepted = true;

        tx.commit().await?;

        tracing::info!(refund_id = %refund.id, order_id = %order.id, "refund accepted");
        Ok(refund)
    }

    /// List refund requests that haven't been accepted, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<Refund>, RepositoryError> {
        let rows = sqlx::query_as::<_, RefundRow>(&format!(
            "SELECT {REFUND_COLUMNS} FROM storefront.refund WHERE NOT accepted ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Refund::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_bad_email_is_corruption() {
        let row = RefundRow {
            id: 1,
            order_id: 2,
            reason: "Wrong size".to_owned(),
            accepted: false,
            email: "not-an-email".to_owned(),
        };
        assert!(matches!(
            Refund::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}

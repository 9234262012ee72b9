//! Refund back-office commands.
//!
//! ```bash
//! outfitter refund list
//! outfitter refund accept 12
//! ```

use outfitter_core::RefundId;
use outfitter_storefront::db::{RefundRepository, RepositoryError};

use super::{CliError, connect};

/// Log refund requests that have not been accepted yet.
pub async fn list_pending() -> Result<(), CliError> {
    let pool = connect().await?;
    let refunds = RefundRepository::new(&pool).list_pending().await?;

    tracing::info!("{} pending refund request(s)", refunds.len());
    for refund in refunds {
        tracing::info!(
            "  #{} order {} from {}: {}",
            refund.id,
            refund.order_id,
            refund.email,
            refund.reason
        );
    }
    Ok(())
}

/// Accept a refund request and mark its order as refunded.
pub async fn accept(id: RefundId) -> Result<(), CliError> {
    let pool = connect().await?;
    let refund = RefundRepository::new(&pool)
        .accept(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::NotFound(format!("No refund with ID {id}")),
            other => other.into(),
        })?;

    tracing::info!("Refund {} accepted for order {}", refund.id, refund.order_id);
    Ok(())
}

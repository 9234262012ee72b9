//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! outfitter migrate
//! ```
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in
//! the storefront crate at build time.

use outfitter_storefront::db::MIGRATOR;

use super::{CliError, connect};

/// Run storefront database migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}

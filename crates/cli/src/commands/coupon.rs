//! Coupon management commands.
//!
//! ```bash
//! outfitter coupon create -c SPRING10 -a 10.00
//! outfitter coupon list
//! ```

use outfitter_core::{Coupon, Money};
use outfitter_storefront::db::CouponRepository;

use super::{CliError, connect};

/// Create a fixed-amount coupon.
pub async fn create(code: &str, amount: Money) -> Result<Coupon, CliError> {
    let pool = connect().await?;
    let coupon = CouponRepository::new(&pool).create(code, amount).await?;

    tracing::info!(
        "Coupon created! ID: {}, Code: {}, Amount: {}",
        coupon.id,
        coupon.code,
        coupon.amount
    );
    Ok(coupon)
}

/// Log every coupon.
pub async fn list() -> Result<(), CliError> {
    let pool = connect().await?;
    let coupons = CouponRepository::new(&pool).list().await?;

    tracing::info!("{} coupon(s)", coupons.len());
    for coupon in coupons {
        tracing::info!("  {:>6}  {:<15} {}", coupon.id, coupon.code, coupon.amount);
    }
    Ok(())
}

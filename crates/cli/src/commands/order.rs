//! Placed-order commands, keyed by the order's reference code.
//!
//! ```bash
//! outfitter order list alice
//! outfitter order show 3f9k2m8q1z0p7x6c5v4b
//! outfitter order ship 3f9k2m8q1z0p7x6c5v4b
//! outfitter order receive 3f9k2m8q1z0p7x6c5v4b
//! ```

use outfitter_core::{Order, OrderSummary, RefCode};
use outfitter_storefront::db::{
    AddressRepository, OrderRepository, PaymentRepository, RepositoryError, UserRepository,
};

use super::{CliError, connect};

fn not_found(ref_code: &RefCode) -> impl Fn(RepositoryError) -> CliError + '_ {
    move |e| match e {
        RepositoryError::NotFound => {
            CliError::NotFound(format!("No placed order with reference {ref_code}"))
        }
        other => other.into(),
    }
}

/// Log a user's placed orders, newest first.
pub async fn list(username: &str) -> Result<Vec<Order>, CliError> {
    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .get_by_username(username)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("No user named {username}")))?;

    let orders = OrderRepository::new(&pool)
        .list_placed_for_user(user.id)
        .await?;

    tracing::info!("{} placed order(s) for {}", orders.len(), user.username);
    for order in &orders {
        let placed = order
            .ordered_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let ref_code = order
            .ref_code
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        tracing::info!("  {ref_code}  {placed}  {}", order.stage());
    }
    Ok(orders)
}

/// Log an order's lines, totals, payment and billing address.
pub async fn show(ref_code: &RefCode) -> Result<OrderSummary, CliError> {
    let pool = connect().await?;
    let orders = OrderRepository::new(&pool);
    let order = orders
        .get_by_ref_code(ref_code)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("No placed order with reference {ref_code}")))?;
    let summary = orders.summary(order.id).await.map_err(not_found(ref_code))?;

    tracing::info!("Order {} ({})", ref_code, summary.order.stage());
    for line in &summary.lines {
        tracing::info!(
            "  {:>3} x {:<30} {}",
            line.quantity(),
            line.item.title,
            line.final_price()
        );
    }
    if let Some(coupon) = &summary.coupon {
        tracing::info!("  coupon {} (-{})", coupon.code, coupon.amount);
    }
    tracing::info!("  total {}", summary.total());

    if let Some(payment_id) = summary.order.payment_id
        && let Some(payment) = PaymentRepository::new(&pool).get(payment_id).await?
    {
        tracing::info!(
            "  paid {} on {} (charge {})",
            payment.amount,
            payment.timestamp.format("%Y-%m-%d %H:%M"),
            payment.stripe_charge_id
        );
    }
    if let Some(address_id) = summary.order.billing_address_id
        && let Some(address) = AddressRepository::new(&pool).get(address_id).await?
    {
        tracing::info!(
            "  bill to {}, {}, {} {}",
            address.street_address,
            address.house_address,
            address.zip,
            address.country
        );
    }
    Ok(summary)
}

/// Mark an order as handed to the carrier.
pub async fn ship(ref_code: &RefCode) -> Result<Order, CliError> {
    let pool = connect().await?;
    let order = OrderRepository::new(&pool)
        .mark_being_delivered(ref_code)
        .await
        .map_err(not_found(ref_code))?;

    tracing::info!("Order {} is being delivered ({})", ref_code, order.stage());
    Ok(order)
}

/// Mark an order as received by the customer.
pub async fn receive(ref_code: &RefCode) -> Result<Order, CliError> {
    let pool = connect().await?;
    let order = OrderRepository::new(&pool)
        .mark_received(ref_code)
        .await
        .map_err(not_found(ref_code))?;

    tracing::info!("Order {} received ({})", ref_code, order.stage());
    Ok(order)
}

//! Cart repository: a user's open order and its lines.
//!
//! Each user has at most one open cart (an order with `ordered = false`),
//! enforced by the `order_one_open_cart_idx` partial unique index. Lines are
//! created on first add and deleted rather than decremented to zero.

use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use outfitter_core::{
    BillingAddress, Coupon, ItemId, NewBillingAddress, Order, OrderItemId, OrderSummary, UserId,
};

use super::orders::{ORDER_COLUMNS, OrderRow, load_summary};
use super::{RepositoryError, addresses, decode_quantity};

/// What a cart operation did to the item's line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum CartChange {
    /// A new line with quantity 1.
    Added,
    /// An existing line went up by one.
    Incremented { quantity: u32 },
    /// An existing line went down by one.
    Decremented { quantity: u32 },
    /// The line was deleted.
    Removed,
    /// The item wasn't in the cart; nothing changed.
    NotInCart,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRef {
    id: i32,
    quantity: i32,
}

async fn lock_open_cart(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM storefront.order o \
         WHERE o.user_id = $1 AND NOT o.ordered FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(Order::try_from).transpose()
}

async fn find_line(
    conn: &mut PgConnection,
    order: &Order,
    item_id: ItemId,
) -> Result<Option<LineRef>, RepositoryError> {
    let line = sqlx::query_as::<_, LineRef>(
        r"
        SELECT oi.id, oi.quantity
        FROM storefront.order_order_item ooi
        JOIN storefront.order_item oi ON oi.id = ooi.order_item_id
        WHERE ooi.order_id = $1 AND oi.item_id = $2
        FOR UPDATE OF oi
        ",
    )
    .bind(order.id)
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(line)
}

async fn delete_line(conn: &mut PgConnection, line_id: OrderItemId) -> Result<(), RepositoryError> {
    // The join row goes with it (ON DELETE CASCADE).
    sqlx::query("DELETE FROM storefront.order_item WHERE id = $1")
        .bind(line_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Repository for the open cart.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's open cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn open_cart(&self, user_id: UserId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order o WHERE o.user_id = $1 AND NOT o.ordered"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get the user's open cart with its lines and coupon.
    ///
    /// Returns `None` when the user has no active order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn summary(&self, user_id: UserId) -> Result<Option<OrderSummary>, RepositoryError> {
        let Some(order) = self.open_cart(user_id).await? else {
            return Ok(None);
        };
        let mut conn = self.pool.acquire().await?;
        load_summary(&mut conn, order).await.map(Some)
    }

    /// Add one unit of an item to the user's cart, creating the cart and the
    /// line as needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails (including an
    /// unknown item).
    pub async fn add_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<CartChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO storefront.order (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) WHERE NOT ordered DO NOTHING
            ",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let order = lock_open_cart(&mut tx, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let change = if let Some(line) = find_line(&mut tx, &order, item_id).await? {
            let quantity: i32 = sqlx::query_scalar(
                "UPDATE storefront.order_item SET quantity = quantity + 1 WHERE id = $1 RETURNING quantity",
            )
            .bind(line.id)
            .fetch_one(&mut *tx)
            .await?;
            CartChange::Incremented {
                quantity: decode_quantity(quantity)?,
            }
        } else {
            let line_id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO storefront.order_item (user_id, item_id, quantity, ordered)
                VALUES ($1, $2, 1, FALSE)
                RETURNING id
                ",
            )
            .bind(user_id)
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO storefront.order_order_item (order_id, order_item_id) VALUES ($1, $2)",
            )
            .bind(order.id)
            .bind(line_id)
            .execute(&mut *tx)
            .await?;
            CartChange::Added
        };

        tx.commit().await?;

        tracing::debug!(user_id = %user_id, item_id = %item_id, ?change, "cart updated");
        Ok(change)
    }

    /// Delete an item's line from the user's cart, whatever its quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no active order.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<CartChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order = lock_open_cart(&mut tx, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let Some(line) = find_line(&mut tx, &order, item_id).await? else {
            return Ok(CartChange::NotInCart);
        };
        delete_line(&mut tx, OrderItemId::new(line.id)).await?;
        tx.commit().await?;

        tracing::debug!(user_id = %user_id, item_id = %item_id, "line removed");
        Ok(CartChange::Removed)
    }

    /// Take one unit of an item out of the user's cart; the line is deleted
    /// when its last unit goes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no active order.
    pub async fn remove_single_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<CartChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order = lock_open_cart(&mut tx, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let Some(line) = find_line(&mut tx, &order, item_id).await? else {
            return Ok(CartChange::NotInCart);
        };

        let change = if line.quantity > 1 {
            let quantity: i32 = sqlx::query_scalar(
                "UPDATE storefront.order_item SET quantity = quantity - 1 WHERE id = $1 RETURNING quantity",
            )
            .bind(line.id)
            .fetch_one(&mut *tx)
            .await?;
            CartChange::Decremented {
                quantity: decode_quantity(quantity)?,
            }
        } else {
            delete_line(&mut tx, OrderItemId::new(line.id)).await?;
            CartChange::Removed
        };
        tx.commit().await?;

        Ok(change)
    }

    /// Save a billing address and attach it to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no active order
    /// and `RepositoryError::Invalid` if the address is invalid.
    pub async fn set_billing_address(
        &self,
        user_id: UserId,
        new: NewBillingAddress,
    ) -> Result<BillingAddress, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order = lock_open_cart(&mut tx, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let address = addresses::insert(&mut tx, user_id, new).await?;

        sqlx::query("UPDATE storefront.order SET billing_address_id = $2 WHERE id = $1")
            .bind(order.id)
            .bind(address.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(order_id = %order.id, address_id = %address.id, "billing address attached");
        Ok(address)
    }

    /// Apply a coupon to the user's cart, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no active order.
    pub async fn apply_coupon(
        &self,
        user_id: UserId,
        coupon: &Coupon,
    ) -> Result<OrderSummary, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut order = lock_open_cart(&mut tx, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        sqlx::query("UPDATE storefront.order SET coupon_id = $2 WHERE id = $1")
            .bind(order.id)
            .bind(coupon.id)
            .execute(&mut *tx)
            .await?;
        order.coupon_id = Some(coupon.id);

        let summary = load_summary(&mut tx, order).await?;
        tx.commit().await?;

        tracing::info!(order_id = %summary.order.id, code = %coupon.code, "coupon applied");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_change_wire_format() {
        let json = serde_json::to_value(CartChange::Incremented { quantity: 3 }).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({ "change": "incremented", "quantity": 3 }))
        );
        let json = serde_json::to_value(CartChange::NotInCart).ok();
        assert_eq!(json, Some(serde_json::json!({ "change": "not_in_cart" })));
    }
}

//! Order repository: placed orders, lifecycle flags and order summaries.
//!
//! The open cart is handled by [`super::CartRepository`]; both share the row
//! mapping and summary loading defined here.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use outfitter_core::{
    BillingAddressId, CartLine, Coupon, CouponId, Item, Order, OrderFlags, OrderId, OrderItem,
    OrderItemId, OrderSummary, Payment, PaymentId, RefCode, UserId,
};

use super::coupons::CouponRow;
use super::items::ItemRow;
use super::payments;
use super::{RepositoryError, conflict_on_unique, decode_column, decode_quantity};

/// Columns selected for every order query, in `OrderRow` order.
pub(crate) const ORDER_COLUMNS: &str = "o.id, o.user_id, o.ref_code, o.start_date, o.ordered_date, \
     o.ordered, o.being_delivered, o.received, o.refund_requested, o.refund_granted, \
     o.billing_address_id, o.payment_id, o.coupon_id";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    id: i32,
    user_id: i32,
    ref_code: Option<String>,
    start_date: DateTime<Utc>,
    ordered_date: Option<DateTime<Utc>>,
    ordered: bool,
    being_delivered: bool,
    received: bool,
    refund_requested: bool,
    refund_granted: bool,
    billing_address_id: Option<i32>,
    payment_id: Option<i32>,
    coupon_id: Option<i32>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let ref_code = row
            .ref_code
            .map(|code| decode_column("ref_code", RefCode::parse(&code)))
            .transpose()?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            ref_code,
            start_date: row.start_date,
            ordered_date: row.ordered_date,
            flags: OrderFlags {
                ordered: row.ordered,
                being_delivered: row.being_delivered,
                received: row.received,
                refund_requested: row.refund_requested,
                refund_granted: row.refund_granted,
            },
            billing_address_id: row.billing_address_id.map(BillingAddressId::new),
            payment_id: row.payment_id.map(PaymentId::new),
            coupon_id: row.coupon_id.map(CouponId::new),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    line_id: i32,
    line_user_id: i32,
    quantity: i32,
    line_ordered: bool,
    #[sqlx(flatten)]
    item: ItemRow,
}

impl TryFrom<LineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: LineRow) -> Result<Self, Self::Error> {
        let item = Item::try_from(row.item)?;
        Ok(Self {
            order_item: OrderItem {
                id: OrderItemId::new(row.line_id),
                user_id: UserId::new(row.line_user_id),
                item_id: item.id,
                quantity: decode_quantity(row.quantity)?,
                ordered: row.line_ordered,
            },
            item,
        })
    }
}

/// Load the lines of an order, oldest first.
pub(crate) async fn fetch_lines(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<Vec<CartLine>, RepositoryError> {
    let rows = sqlx::query_as::<_, LineRow>(
        r"
        SELECT oi.id AS line_id, oi.user_id AS line_user_id, oi.quantity,
               oi.ordered AS line_ordered,
               i.id, i.title, i.price, i.discount_price, i.category, i.label,
               i.slug, i.description, i.image
        FROM storefront.order_order_item ooi
        JOIN storefront.order_item oi ON oi.id = ooi.order_item_id
        JOIN storefront.item i ON i.id = oi.item_id
        WHERE ooi.order_id = $1
        ORDER BY oi.id
        ",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(CartLine::try_from).collect()
}

/// Load an order's lines and coupon into a summary.
pub(crate) async fn load_summary(
    conn: &mut PgConnection,
    order: Order,
) -> Result<OrderSummary, RepositoryError> {
    let lines = fetch_lines(conn, order.id).await?;

    let coupon = match order.coupon_id {
        Some(coupon_id) => sqlx::query_as::<_, CouponRow>(
            "SELECT id, code, amount FROM storefront.coupon WHERE id = $1",
        )
        .bind(coupon_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Coupon::from),
        None => None,
    };

    Ok(OrderSummary {
        order,
        lines,
        coupon,
    })
}

/// Persist the lifecycle flags of an order.
pub(crate) async fn save_flags(
    conn: &mut PgConnection,
    order_id: OrderId,
    flags: OrderFlags,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE storefront.order
        SET ordered = $2, being_delivered = $3, received = $4,
            refund_requested = $5, refund_granted = $6
        WHERE id = $1
        ",
    )
    .bind(order_id)
    .bind(flags.ordered)
    .bind(flags.being_delivered)
    .bind(flags.received)
    .bind(flags.refund_requested)
    .bind(flags.refund_granted)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Fetch an order by reference code, locking it for the rest of the transaction.
pub(crate) async fn lock_by_ref_code(
    conn: &mut PgConnection,
    ref_code: &RefCode,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM storefront.order o WHERE o.ref_code = $1 FOR UPDATE"
    ))
    .bind(ref_code.as_str())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Order::try_from(row)
}

/// Repository for placed orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get a placed order by its reference code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ref_code(
        &self,
        ref_code: &RefCode,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order o WHERE o.ref_code = $1"
        ))
        .bind(ref_code.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get an order with its lines and coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn summary(&self, id: OrderId) -> Result<OrderSummary, RepositoryError> {
        let order = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        let mut conn = self.pool.acquire().await?;
        load_summary(&mut conn, order).await
    }

    /// List a user's placed orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_placed_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM storefront.order o
            WHERE o.user_id = $1 AND o.ordered
            ORDER BY o.ordered_date DESC, o.id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Pay for and place a user's open cart.
    ///
    /// Records a payment for the cart's amount due, flips every line to
    /// ordered and stamps the order with a fresh reference code and the
    /// current time, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no open cart.
    /// Returns `RepositoryError::Lifecycle` if the cart is empty or has no
    /// billing address.
    /// Returns `RepositoryError::Invalid` if the charge id is blank or too long.
    pub async fn place_order(
        &self,
        user_id: UserId,
        stripe_charge_id: &str,
    ) -> Result<(OrderSummary, Payment), RepositoryError> {
        let ref_code = RefCode::generate(&mut rand::rng());
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order o \
             WHERE o.user_id = $1 AND NOT o.ordered FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let mut summary = load_summary(&mut tx, Order::try_from(row)?).await?;

        let payment =
            payments::insert(&mut tx, stripe_charge_id, user_id, summary.amount_due(), now)
                .await?;

        summary
            .order
            .place(summary.lines.len(), payment.id, ref_code, now)?;

        sqlx::query(
            r"
            UPDATE storefront.order_item
            SET ordered = TRUE
            WHERE id IN (
                SELECT order_item_id FROM storefront.order_order_item WHERE order_id = $1
            )
            ",
        )
        .bind(summary.order.id)
        .execute(&mut *tx)
        .await?;

        for line in &mut summary.lines {
            line.order_item.ordered = true;
        }

        sqlx::query(
            r"
            UPDATE storefront.order
            SET ordered = TRUE, ordered_date = $2, payment_id = $3, ref_code = $4
            WHERE id = $1
            ",
        )
        .bind(summary.order.id)
        .bind(summary.order.ordered_date)
        .bind(summary.order.payment_id)
        .bind(summary.order.ref_code.as_ref().map(RefCode::as_str))
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "reference code"))?;

        tx.commit().await?;

        tracing::info!(
            order_id = %summary.order.id,
            payment_id = %payment.id,
            amount = %payment.amount,
            "order placed"
        );

        Ok((summary, payment))
    }

    /// Flag a placed order as handed to the carrier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown reference code and
    /// `RepositoryError::Lifecycle` if the order hasn't been placed.
    pub async fn mark_being_delivered(&self, ref_code: &RefCode) -> Result<Order, RepositoryError> {
        self.update_flags(ref_code, OrderFlags::mark_being_delivered)
            .await
    }

    /// Flag a placed order as received by the customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown reference code and
    /// `RepositoryError::Lifecycle` if the order hasn't been placed.
    pub async fn mark_received(&self, ref_code: &RefCode) -> Result<Order, RepositoryError> {
        self.update_flags(ref_code, OrderFlags::mark_received).await
    }

    async fn update_flags(
        &self,
        ref_code: &RefCode,
        transition: fn(&mut OrderFlags) -> Result<(), outfitter_core::LifecycleError>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut order = lock_by_ref_code(&mut tx, ref_code).await?;
        transition(&mut order.flags)?;
        save_flags(&mut tx, order.id, order.flags).await?;
        tx.commit().await?;

        tracing::info!(order_id = %order.id, stage = %order.stage(), "order updated");
        Ok(order)
    }
}

//! Repository tests against a real `PostgreSQL` database.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable through `DATABASE_URL`
//!
//! Migrations are applied on connect. Every test works on its own user,
//! items and coupon, so the suite can run against a shared database.
//!
//! Run with: `cargo test -p outfitter-integration-tests --test repositories -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use outfitter_core::{
    Category, Coupon, CountryCode, Email, Item, Label, LifecycleError, NewBillingAddress, NewItem,
    OrderSummary, Payment, RefCode, User,
};
use outfitter_integration_tests::money;
use outfitter_storefront::db::carts::CartChange;
use outfitter_storefront::db::{
    AddressRepository, CartRepository, CouponRepository, ItemRepository, MIGRATOR,
    OrderRepository, PaymentRepository, RefundRepository, RepositoryError, UserRepository,
};

// ============================================================================
// Setup
// ============================================================================

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{:08x}", rand::random::<u32>())
}

async fn create_user(pool: &PgPool) -> User {
    UserRepository::new(pool)
        .create_with_password(&unique("shopper-"), None, "not-a-real-hash")
        .await
        .unwrap()
}

async fn create_item(pool: &PgPool, price: &str, discount: Option<&str>) -> Item {
    ItemRepository::new(pool)
        .create(&NewItem {
            title: unique("Test Tee "),
            price: money(price),
            discount_price: discount.map(money),
            category: Category::Shirt,
            label: Label::Primary,
            slug: None,
            description: String::new(),
            image: String::new(),
        })
        .await
        .unwrap()
}

async fn create_coupon(pool: &PgPool, amount: &str) -> Coupon {
    CouponRepository::new(pool)
        .create(&unique("T"), money(amount))
        .await
        .unwrap()
}

fn address() -> NewBillingAddress {
    NewBillingAddress {
        street_address: "1 Harbour Road".to_owned(),
        house_address: "Flat 2".to_owned(),
        country: CountryCode::parse("IE").unwrap(),
        zip: "D02 X285".to_owned(),
    }
}

/// A tee at 20.00 (x2) and a jacket at 50.00 discounted to 45.00, with a
/// 10.00 coupon: subtotal 85.00, amount due 75.00.
async fn placed_order(pool: &PgPool, user: &User) -> (OrderSummary, Payment, Vec<Item>, Coupon) {
    let tee = create_item(pool, "20.00", None).await;
    let jacket = create_item(pool, "50.00", Some("45.00")).await;
    let coupon = create_coupon(pool, "10.00").await;

    let carts = CartRepository::new(pool);
    carts.add_item(user.id, tee.id).await.unwrap();
    carts.add_item(user.id, tee.id).await.unwrap();
    carts.add_item(user.id, jacket.id).await.unwrap();
    carts.set_billing_address(user.id, address()).await.unwrap();
    carts.apply_coupon(user.id, &coupon).await.unwrap();

    let (summary, payment) = OrderRepository::new(pool)
        .place_order(user.id, "ch_test_123")
        .await
        .unwrap();
    (summary, payment, vec![tee, jacket], coupon)
}

async fn cleanup(pool: &PgPool, user: &User, items: &[Item], coupons: &[Coupon]) {
    let _ = sqlx::query("DELETE FROM storefront.payment WHERE user_id = $1")
        .bind(user.id.as_i32())
        .execute(pool)
        .await;
    let _ = UserRepository::new(pool).delete(user.id).await;
    for item in items {
        let _ = sqlx::query("DELETE FROM storefront.item WHERE id = $1")
            .bind(item.id.as_i32())
            .execute(pool)
            .await;
    }
    for coupon in coupons {
        let _ = sqlx::query("DELETE FROM storefront.coupon WHERE id = $1")
            .bind(coupon.id.as_i32())
            .execute(pool)
            .await;
    }
}

async fn count(pool: &PgPool, sql: &str, id: i32) -> i64 {
    sqlx::query_scalar(sql).bind(id).fetch_one(pool).await.unwrap()
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_cart_add_and_remove_lines() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let tee = create_item(&pool, "20.00", None).await;
    let jacket = create_item(&pool, "50.00", Some("45.00")).await;
    let carts = CartRepository::new(&pool);

    assert_eq!(carts.add_item(user.id, tee.id).await.unwrap(), CartChange::Added);
    assert_eq!(
        carts.add_item(user.id, tee.id).await.unwrap(),
        CartChange::Incremented { quantity: 2 }
    );
    assert_eq!(carts.add_item(user.id, jacket.id).await.unwrap(), CartChange::Added);

    let summary = carts.summary(user.id).await.unwrap().unwrap();
    assert_eq!(summary.lines.len(), 2);
    assert_eq!(summary.item_count(), 3);
    assert_eq!(summary.subtotal(), money("85.00"));
    assert_eq!(summary.amount_saved(), money("5.00"));

    assert_eq!(
        carts.remove_single_item(user.id, tee.id).await.unwrap(),
        CartChange::Decremented { quantity: 1 }
    );
    assert_eq!(
        carts.remove_single_item(user.id, tee.id).await.unwrap(),
        CartChange::Removed
    );
    assert_eq!(
        carts.remove_single_item(user.id, tee.id).await.unwrap(),
        CartChange::NotInCart
    );

    carts.add_item(user.id, jacket.id).await.unwrap();
    assert_eq!(
        carts.remove_item(user.id, jacket.id).await.unwrap(),
        CartChange::Removed
    );
    assert_eq!(
        carts.remove_item(user.id, jacket.id).await.unwrap(),
        CartChange::NotInCart
    );

    // The cart survives with no lines.
    let summary = carts.summary(user.id).await.unwrap().unwrap();
    assert!(summary.is_empty());

    cleanup(&pool, &user, &[tee, jacket], &[]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_remove_without_cart_is_not_found() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let tee = create_item(&pool, "20.00", None).await;
    let carts = CartRepository::new(&pool);

    assert!(carts.summary(user.id).await.unwrap().is_none());
    assert!(matches!(
        carts.remove_item(user.id, tee.id).await,
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        carts.remove_single_item(user.id, tee.id).await,
        Err(RepositoryError::NotFound)
    ));

    cleanup(&pool, &user, &[tee], &[]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_apply_coupon_replaces_previous_one() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let tee = create_item(&pool, "20.00", None).await;
    let five = create_coupon(&pool, "5.00").await;
    let fifty = create_coupon(&pool, "50.00").await;
    let carts = CartRepository::new(&pool);
    carts.add_item(user.id, tee.id).await.unwrap();

    let summary = carts.apply_coupon(user.id, &five).await.unwrap();
    assert_eq!(summary.coupon.as_ref().map(|c| c.id), Some(five.id));
    assert_eq!(summary.total(), money("15.00"));

    // Worth more than the cart: the total goes negative, the amount due doesn't.
    let summary = carts.apply_coupon(user.id, &fifty).await.unwrap();
    assert_eq!(summary.coupon.as_ref().map(|c| c.id), Some(fifty.id));
    assert_eq!(summary.total(), money("-30.00"));
    assert_eq!(summary.amount_due(), money("0"));

    cleanup(&pool, &user, &[tee], &[five, fifty]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_one_open_cart_per_user() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let tee = create_item(&pool, "20.00", None).await;
    let jacket = create_item(&pool, "50.00", None).await;
    let carts = CartRepository::new(&pool);

    carts.add_item(user.id, tee.id).await.unwrap();
    carts.add_item(user.id, jacket.id).await.unwrap();

    let open_carts = "SELECT COUNT(*) FROM storefront.order WHERE user_id = $1 AND NOT ordered";
    assert_eq!(count(&pool, open_carts, user.id.as_i32()).await, 1);

    let second = sqlx::query("INSERT INTO storefront.order (user_id) VALUES ($1)")
        .bind(user.id.as_i32())
        .execute(&pool)
        .await;
    let is_unique_violation = matches!(
        &second,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation()
    );
    assert!(is_unique_violation, "second open cart was accepted: {second:?}");

    cleanup(&pool, &user, &[tee, jacket], &[]).await;
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_place_order_records_payment_for_amount_due() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let (summary, payment, items, coupon) = placed_order(&pool, &user).await;

    assert!(summary.order.flags.ordered);
    assert!(summary.order.ordered_date.is_some());
    assert_eq!(summary.order.payment_id, Some(payment.id));
    assert!(summary.lines.iter().all(|l| l.order_item.ordered));
    assert_eq!(payment.amount, money("75.00"));
    assert_eq!(payment.amount, summary.amount_due());
    assert_eq!(payment.user_id, Some(user.id));
    assert_eq!(payment.stripe_charge_id, "ch_test_123");

    let ref_code = summary.order.ref_code.clone().unwrap();
    let stored = OrderRepository::new(&pool)
        .get_by_ref_code(&ref_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, summary.order.id);
    assert!(stored.flags.ordered);

    let lines_not_ordered =
        "SELECT COUNT(*) FROM storefront.order_item WHERE user_id = $1 AND NOT ordered";
    assert_eq!(count(&pool, lines_not_ordered, user.id.as_i32()).await, 0);

    let address_id = stored.billing_address_id.unwrap();
    let address = AddressRepository::new(&pool).get(address_id).await.unwrap().unwrap();
    assert_eq!(address.user_id, user.id);
    assert_eq!(address.street_address, "1 Harbour Road");

    // The placed order is no longer the cart; the next add opens a new one.
    let carts = CartRepository::new(&pool);
    assert!(carts.open_cart(user.id).await.unwrap().is_none());
    carts.add_item(user.id, items[0].id).await.unwrap();
    let cart = carts.open_cart(user.id).await.unwrap().unwrap();
    assert_ne!(cart.id, summary.order.id);

    let placed = OrderRepository::new(&pool)
        .list_placed_for_user(user.id)
        .await
        .unwrap();
    assert_eq!(placed.len(), 1);

    cleanup(&pool, &user, &items, &[coupon]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_place_order_needs_lines_and_address() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let tee = create_item(&pool, "20.00", None).await;
    let carts = CartRepository::new(&pool);
    let orders = OrderRepository::new(&pool);

    assert!(matches!(
        orders.place_order(user.id, "ch_1").await,
        Err(RepositoryError::NotFound)
    ));

    carts.add_item(user.id, tee.id).await.unwrap();
    assert!(matches!(
        orders.place_order(user.id, "ch_1").await,
        Err(RepositoryError::Lifecycle(LifecycleError::MissingBillingAddress))
    ));

    carts.remove_item(user.id, tee.id).await.unwrap();
    carts.set_billing_address(user.id, address()).await.unwrap();
    assert!(matches!(
        orders.place_order(user.id, "ch_1").await,
        Err(RepositoryError::Lifecycle(LifecycleError::EmptyCart))
    ));

    // Nothing was charged for the refused attempts.
    let payments = "SELECT COUNT(*) FROM storefront.payment WHERE user_id = $1";
    assert_eq!(count(&pool, payments, user.id.as_i32()).await, 0);

    cleanup(&pool, &user, &[tee], &[]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_bad_input_is_invalid_not_conflict() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let tee = create_item(&pool, "20.00", None).await;
    let carts = CartRepository::new(&pool);
    carts.add_item(user.id, tee.id).await.unwrap();

    let mut blank = address();
    blank.street_address = "  ".to_owned();
    assert!(matches!(
        carts.set_billing_address(user.id, blank).await,
        Err(RepositoryError::Invalid(_))
    ));

    carts.set_billing_address(user.id, address()).await.unwrap();
    assert!(matches!(
        OrderRepository::new(&pool).place_order(user.id, "   ").await,
        Err(RepositoryError::Invalid(_))
    ));
    assert!(carts.open_cart(user.id).await.unwrap().is_some());

    let coupons = CouponRepository::new(&pool);
    assert!(matches!(
        coupons.create("", money("1.00")).await,
        Err(RepositoryError::Invalid(_))
    ));
    assert!(matches!(
        coupons.create(&unique("T"), money("-1.00")).await,
        Err(RepositoryError::Invalid(_))
    ));

    // A duplicate is still a conflict.
    let coupon = create_coupon(&pool, "1.00").await;
    assert!(matches!(
        coupons.create(&coupon.code, money("1.00")).await,
        Err(RepositoryError::Conflict(_))
    ));

    cleanup(&pool, &user, &[tee], &[coupon]).await;
}

// ============================================================================
// Refunds
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_refund_request_and_accept() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let (summary, _, items, coupon) = placed_order(&pool, &user).await;
    let ref_code = summary.order.ref_code.clone().unwrap();
    let email = Email::parse("shopper@example.com").unwrap();
    let refunds = RefundRepository::new(&pool);

    assert!(matches!(
        refunds.request(&ref_code, "   ", &email).await,
        Err(RepositoryError::Invalid(_))
    ));

    let refund = refunds.request(&ref_code, "Too big", &email).await.unwrap();
    assert_eq!(refund.order_id, summary.order.id);
    assert!(!refund.accepted);
    assert!(matches!(
        refunds.request(&ref_code, "Again", &email).await,
        Err(RepositoryError::Lifecycle(LifecycleError::RefundAlreadyRequested))
    ));
    assert!(
        refunds
            .list_pending()
            .await
            .unwrap()
            .iter()
            .any(|r| r.id == refund.id)
    );

    let accepted = refunds.accept(refund.id).await.unwrap();
    assert!(accepted.accepted);
    let order = OrderRepository::new(&pool)
        .get(summary.order.id)
        .await
        .unwrap()
        .unwrap();
    assert!(order.flags.refund_requested);
    assert!(order.flags.refund_granted);

    assert!(matches!(
        refunds.accept(refund.id).await,
        Err(RepositoryError::Lifecycle(LifecycleError::RefundAlreadyGranted))
    ));
    assert!(
        !refunds
            .list_pending()
            .await
            .unwrap()
            .iter()
            .any(|r| r.id == refund.id)
    );

    cleanup(&pool, &user, &items, &[coupon]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_refund_for_unknown_reference_is_not_found() {
    let pool = pool().await;
    let unknown = RefCode::generate(&mut rand::rng());
    let email = Email::parse("shopper@example.com").unwrap();

    assert!(matches!(
        RefundRepository::new(&pool).request(&unknown, "Lost", &email).await,
        Err(RepositoryError::NotFound)
    ));
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL database (DATABASE_URL)"]
async fn test_deleting_user_cascades_but_keeps_payments() {
    let pool = pool().await;
    let user = create_user(&pool).await;
    let (summary, payment, items, coupon) = placed_order(&pool, &user).await;
    let user_id = user.id.as_i32();

    UserRepository::new(&pool).delete(user.id).await.unwrap();

    let orders = "SELECT COUNT(*) FROM storefront.order WHERE user_id = $1";
    let lines = "SELECT COUNT(*) FROM storefront.order_item WHERE user_id = $1";
    let addresses = "SELECT COUNT(*) FROM storefront.billing_address WHERE user_id = $1";
    assert_eq!(count(&pool, orders, user_id).await, 0);
    assert_eq!(count(&pool, lines, user_id).await, 0);
    assert_eq!(count(&pool, addresses, user_id).await, 0);

    let kept = PaymentRepository::new(&pool)
        .get(payment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.user_id, None);
    assert_eq!(kept.amount, summary.amount_due());

    assert!(matches!(
        UserRepository::new(&pool).delete(user.id).await,
        Err(RepositoryError::NotFound)
    ));

    let _ = sqlx::query("DELETE FROM storefront.payment WHERE id = $1")
        .bind(payment.id.as_i32())
        .execute(&pool)
        .await;
    cleanup(&pool, &user, &items, &[coupon]).await;
}

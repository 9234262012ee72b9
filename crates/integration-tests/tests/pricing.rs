//! Price arithmetic across lines, coupons and order totals.

use outfitter_core::Money;
use outfitter_integration_tests::{coupon, item, line, money, summary};

#[test]
fn test_line_without_discount() {
    let shirt = line(item(1, "Oxford Shirt", "45.00", None), 3);

    assert_eq!(shirt.total_item_price(), money("135.00"));
    assert_eq!(shirt.total_discount_item_price(), None);
    assert_eq!(shirt.amount_saved(), Money::ZERO);
    assert_eq!(shirt.final_price(), money("135.00"));
    assert_eq!(shirt.to_string(), "3 of Oxford Shirt");
}

#[test]
fn test_line_with_discount() {
    let tee = line(item(2, "Running Tee", "25.00", Some("19.50")), 2);

    assert_eq!(tee.total_item_price(), money("50.00"));
    assert_eq!(tee.total_discount_item_price(), Some(money("39.00")));
    assert_eq!(tee.amount_saved(), money("11.00"));
    assert_eq!(tee.final_price(), money("39.00"));
}

#[test]
fn test_zero_discount_counts_as_no_sale() {
    let hat = line(item(3, "Bucket Hat", "20.00", Some("0")), 1);

    assert_eq!(hat.total_discount_item_price(), None);
    assert_eq!(hat.final_price(), money("20.00"));
}

#[test]
fn test_final_price_is_total_minus_saved() {
    for discount in [None, Some("9.99"), Some("0.01")] {
        let l = line(item(4, "Rain Shell", "10.00", discount), 7);
        assert_eq!(l.final_price(), l.total_item_price() - l.amount_saved());
    }
}

#[test]
fn test_summary_totals_with_coupon() {
    let order = summary(
        vec![
            line(item(1, "Oxford Shirt", "45.00", None), 1),
            line(item(2, "Running Tee", "25.00", Some("19.50")), 2),
        ],
        Some(coupon("SPRING10", "10.00")),
    );

    assert_eq!(order.subtotal(), money("84.00"));
    assert_eq!(order.coupon_discount(), money("10.00"));
    assert_eq!(order.total(), money("74.00"));
    assert_eq!(order.amount_due(), money("74.00"));
    assert_eq!(order.amount_saved(), money("11.00"));
    assert_eq!(order.item_count(), 3);
}

#[test]
fn test_coupon_larger_than_cart() {
    let order = summary(
        vec![line(item(1, "Socks", "4.00", None), 1)],
        Some(coupon("BIG", "10.00")),
    );

    assert_eq!(order.total(), money("-6.00"));
    assert_eq!(order.amount_due(), Money::ZERO);
}

#[test]
fn test_empty_cart() {
    let order = summary(Vec::new(), None);

    assert!(order.is_empty());
    assert_eq!(order.subtotal(), Money::ZERO);
    assert_eq!(order.total(), Money::ZERO);
    assert_eq!(order.item_count(), 0);
}

#[test]
fn test_decimal_amounts_do_not_drift() {
    let order = summary(
        (0..10)
            .map(|i| line(item(i, &format!("Button {i}"), "0.10", None), 1))
            .collect(),
        None,
    );

    assert_eq!(order.subtotal(), money("1.00"));
    assert_eq!(order.subtotal().display_with("$"), "$1.00");
}

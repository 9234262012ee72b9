//! Placing orders and moving them through delivery and refunds.

use chrono::Utc;
use outfitter_core::{LifecycleError, OrderStage, PaymentId, RefCode};
use outfitter_integration_tests::{addressed_cart, cart};

fn ref_code() -> RefCode {
    RefCode::generate(&mut rand::rng())
}

#[test]
fn test_place_sets_payment_and_ref_code() {
    let mut order = addressed_cart();
    let code = ref_code();
    let now = Utc::now();

    order.place(2, PaymentId::new(9), code.clone(), now).unwrap();

    assert!(order.flags.ordered);
    assert!(!order.is_cart());
    assert_eq!(order.payment_id, Some(PaymentId::new(9)));
    assert_eq!(order.ref_code, Some(code));
    assert_eq!(order.ordered_date, Some(now));
    assert_eq!(order.stage(), OrderStage::Ordered);
}

#[test]
fn test_place_requires_lines_and_address() {
    let mut empty = addressed_cart();
    assert_eq!(
        empty.place(0, PaymentId::new(1), ref_code(), Utc::now()),
        Err(LifecycleError::EmptyCart)
    );

    let mut no_address = cart();
    assert_eq!(
        no_address.place(1, PaymentId::new(1), ref_code(), Utc::now()),
        Err(LifecycleError::MissingBillingAddress)
    );
    assert!(no_address.ref_code.is_none());
}

#[test]
fn test_place_twice_is_refused() {
    let mut order = addressed_cart();
    order.place(1, PaymentId::new(1), ref_code(), Utc::now()).unwrap();

    let first_code = order.ref_code.clone();
    assert_eq!(
        order.place(1, PaymentId::new(2), ref_code(), Utc::now()),
        Err(LifecycleError::AlreadyOrdered)
    );
    assert_eq!(order.ref_code, first_code);
    assert_eq!(order.payment_id, Some(PaymentId::new(1)));
}

#[test]
fn test_delivery_needs_a_placed_order() {
    let mut order = cart();
    assert_eq!(
        order.flags.mark_being_delivered(),
        Err(LifecycleError::NotOrdered)
    );
    assert_eq!(order.flags.mark_received(), Err(LifecycleError::NotOrdered));
    assert_eq!(order.flags.request_refund(), Err(LifecycleError::NotOrdered));
}

#[test]
fn test_full_delivery_then_refund() {
    let mut order = addressed_cart();
    order.place(1, PaymentId::new(1), ref_code(), Utc::now()).unwrap();

    order.flags.mark_being_delivered().unwrap();
    assert_eq!(order.stage(), OrderStage::BeingDelivered);

    order.flags.mark_received().unwrap();
    assert_eq!(order.stage(), OrderStage::Received);

    order.flags.request_refund().unwrap();
    assert_eq!(order.stage(), OrderStage::RefundRequested);
    assert_eq!(
        order.flags.request_refund(),
        Err(LifecycleError::RefundAlreadyRequested)
    );

    order.flags.grant_refund().unwrap();
    assert_eq!(order.stage(), OrderStage::RefundGranted);
    assert_eq!(
        order.flags.grant_refund(),
        Err(LifecycleError::RefundAlreadyGranted)
    );
}

#[test]
fn test_grant_without_request() {
    let mut order = addressed_cart();
    order.place(1, PaymentId::new(1), ref_code(), Utc::now()).unwrap();

    assert_eq!(
        order.flags.grant_refund(),
        Err(LifecycleError::RefundNotRequested)
    );
}

#[test]
fn test_generated_ref_codes_parse_back() {
    for _ in 0..50 {
        let code = ref_code();
        assert_eq!(code.as_str().len(), 20);
        assert_eq!(RefCode::parse(code.as_str()).unwrap(), code);
    }
}

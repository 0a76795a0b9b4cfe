use axum_bookstore_api::{
    entity::enums::{OrderStatus, PaymentStatus},
    error::AppError,
    services::{
        order_service::ensure_cancellable,
        payment_service::{card_outcome, generate_transaction_id, normalize_card_number},
    },
};

#[test]
fn card_number_whitespace_is_stripped() {
    let card = normalize_card_number("4111 1111 1111 1111").expect("valid card");
    assert_eq!(card, "4111111111111111");
}

#[test]
fn malformed_card_numbers_are_rejected() {
    for raw in ["4111", "4111 1111 1111 111a", "41111111111111112", ""] {
        let err = normalize_card_number(raw).expect_err(raw);
        assert!(matches!(err, AppError::BadRequest(_)), "{raw}");
    }
}

#[test]
fn well_formed_cards_are_approved() {
    assert_eq!(card_outcome("4111111111111111"), PaymentStatus::Success);
    assert_eq!(card_outcome("4111111111111112"), PaymentStatus::Success);
}

#[test]
fn transaction_id_shape() {
    let id = generate_transaction_id();
    let suffix = id.strip_prefix("TRX-").expect("prefix");
    assert_eq!(suffix.len(), 8);
    assert!(
        suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    );
}

#[test]
fn shipped_and_delivered_orders_cannot_be_cancelled() {
    for status in [OrderStatus::Shipped, OrderStatus::Delivered] {
        assert!(matches!(
            ensure_cancellable(status),
            Err(AppError::InvalidState(_))
        ));
    }
    for status in [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::PaymentFailed,
        OrderStatus::Cancelled,
    ] {
        assert!(ensure_cancellable(status).is_ok());
    }
}

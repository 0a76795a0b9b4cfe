use axum_bookstore_api::{
    dto::orders::{CreateOrderRequest, OrderLineRequest},
    error::AppError,
    services::{
        order_service::{MAX_AMOUNT, ensure_total_in_range},
        product_service::check_price,
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

fn order_of(quantity: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        items: vec![OrderLineRequest {
            product_id: Uuid::new_v4(),
            quantity,
        }],
    }
}

#[test]
fn quantity_must_be_within_bounds() {
    assert!(order_of(1).validate().is_ok());
    assert!(order_of(10_000).validate().is_ok());
    assert!(order_of(0).validate().is_err());
    assert!(order_of(10_001).validate().is_err());
    assert!(order_of(2_000_000_000).validate().is_err());
}

#[test]
fn empty_order_is_invalid() {
    let err = AppError::from(
        CreateOrderRequest { items: vec![] }
            .validate()
            .expect_err("empty"),
    );
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn totals_fit_the_money_column() {
    assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    assert!(ensure_total_in_range(MAX_AMOUNT).is_ok());
    assert!(ensure_total_in_range(Decimal::new(30, 0)).is_ok());

    let too_large = Decimal::new(100, 0) * Decimal::from(2_000_000_000i64);
    let err = ensure_total_in_range(too_large).expect_err("overflow");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn prices_fit_the_money_column() {
    assert!(check_price(Decimal::ZERO).is_ok());
    assert!(check_price(MAX_AMOUNT).is_ok());
    assert!(matches!(
        check_price(Decimal::new(-1, 2)),
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        check_price(MAX_AMOUNT + Decimal::new(1, 2)),
        Err(AppError::BadRequest(_))
    ));
}

use axum_bookstore_api::{
    entity::{Orders, Payments, Products, enums::OrderStatus},
    routes::params::{OrderFilterQuery, PaymentFilterQuery, ProductQuery},
    services::filters::{order_condition, payment_condition, product_condition},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};
use uuid::Uuid;

#[test]
fn empty_product_filter_only_hides_deleted_and_inactive() {
    let sql = Products::find()
        .filter(product_condition(&ProductQuery::default(), false))
        .build(DbBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""state" = 'ACTIVE'"#), "{sql}");
    assert!(sql.contains(r#""is_active" = TRUE"#), "{sql}");
    assert!(!sql.contains("ILIKE"), "{sql}");
    assert!(!sql.contains("product_categories"), "{sql}");
}

#[test]
fn admin_product_filter_keeps_inactive_products() {
    let sql = Products::find()
        .filter(product_condition(&ProductQuery::default(), true))
        .build(DbBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""state" = 'ACTIVE'"#), "{sql}");
    assert!(!sql.contains(r#""is_active" = TRUE"#), "{sql}");
}

#[test]
fn product_filters_compose() {
    let category_id = Uuid::new_v4();
    let query = ProductQuery {
        search: Some("  rust ".into()),
        category_id: Some(category_id),
        min_price: Some(Decimal::new(10, 0)),
        max_price: Some(Decimal::new(50, 0)),
        ..Default::default()
    };
    let sql = Products::find()
        .filter(product_condition(&query, false))
        .build(DbBackend::Postgres)
        .to_string();

    assert!(sql.contains("ILIKE '%rust%'"), "{sql}");
    assert!(sql.contains(r#""price" >="#), "{sql}");
    assert!(sql.contains(r#""price" <="#), "{sql}");
    assert!(sql.contains("product_categories"), "{sql}");
    assert!(sql.contains(&category_id.to_string()), "{sql}");
}

#[test]
fn blank_search_is_ignored() {
    let query = ProductQuery {
        search: Some("   ".into()),
        ..Default::default()
    };
    let sql = Products::find()
        .filter(product_condition(&query, false))
        .build(DbBackend::Postgres)
        .to_string();
    assert!(!sql.contains("ILIKE"), "{sql}");
}

#[test]
fn order_filter_covers_whole_end_day() {
    let user_id = Uuid::new_v4();
    let query = OrderFilterQuery {
        status: Some(OrderStatus::Paid),
        date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
        date_to: NaiveDate::from_ymd_opt(2024, 1, 31),
        user_id: Some(user_id),
        ..Default::default()
    };
    let sql = Orders::find()
        .filter(order_condition(&query))
        .build(DbBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""state" = 'ACTIVE'"#), "{sql}");
    assert!(sql.contains(r#""status" = 'PAID'"#), "{sql}");
    assert!(sql.contains(&user_id.to_string()), "{sql}");
    assert!(sql.contains("2024-01-01 00:00:00"), "{sql}");
    assert!(sql.contains("2024-02-01 00:00:00"), "{sql}");
    assert!(sql.contains(r#""created_at" <"#), "{sql}");
}

#[test]
fn empty_payment_filter_adds_no_clause() {
    let sql = Payments::find()
        .filter(payment_condition(&PaymentFilterQuery::default()))
        .build(DbBackend::Postgres)
        .to_string();
    assert!(sql.ends_with("WHERE TRUE"), "{sql}");
}

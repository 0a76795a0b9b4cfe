use axum_bookstore_api::{
    entity::enums::{OrderStatus, PaymentStatus},
    services::reporting::{
        bucket_orders, bucket_payments, percentage, status_counts, window, window_start,
    },
};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn window_covers_exactly_the_requested_days() {
    let today = day(2024, 3, 2);
    let days = window(today, 7);
    assert_eq!(days.len(), 7);
    assert_eq!(days.first(), Some(&day(2024, 2, 25)));
    assert_eq!(days.last(), Some(&today));
    assert_eq!(window_start(today, 1), today);
}

#[test]
fn orders_are_bucketed_by_utc_day_and_zero_filled() {
    let today = day(2024, 1, 10);
    let orders = vec![
        (
            Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 0).unwrap(),
            OrderStatus::Paid,
            Decimal::new(3000, 2),
        ),
        (
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            OrderStatus::Pending,
            Decimal::new(1000, 2),
        ),
        (
            Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap(),
            OrderStatus::Cancelled,
            Decimal::new(500, 2),
        ),
        // Outside the window.
        (
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            OrderStatus::Paid,
            Decimal::new(9900, 2),
        ),
    ];

    let report = bucket_orders(today, 3, orders);
    assert_eq!(report.len(), 3);
    assert_eq!(
        report.iter().map(|d| d.date).collect::<Vec<_>>(),
        vec![day(2024, 1, 8), day(2024, 1, 9), day(2024, 1, 10)]
    );

    assert_eq!(report[0].total, 1);
    assert_eq!(report[0].by_status.get(OrderStatus::Cancelled), 1);
    assert_eq!(report[1].total, 0);
    assert_eq!(report[1].revenue, Decimal::ZERO);
    assert_eq!(report[2].total, 2);
    assert_eq!(report[2].revenue, Decimal::new(4000, 2));
    assert_eq!(report[2].by_status.get(OrderStatus::Paid), 1);
    assert_eq!(report[2].by_status.get(OrderStatus::Pending), 1);
}

#[test]
fn payment_revenue_counts_only_successes() {
    let today = day(2024, 5, 1);
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let payments = vec![
        (at, PaymentStatus::Success, Decimal::new(2500, 2)),
        (at, PaymentStatus::Failed, Decimal::new(1000, 2)),
        (at, PaymentStatus::Pending, Decimal::new(700, 2)),
    ];

    let report = bucket_payments(today, 1, payments);
    assert_eq!(report.len(), 1);
    let entry = &report[0];
    assert_eq!((entry.total, entry.success, entry.failed, entry.pending), (3, 1, 1, 1));
    assert_eq!(entry.revenue, Decimal::new(2500, 2));
}

#[test]
fn status_counts_are_zero_filled_with_upper_case_keys() {
    let counts = status_counts(vec![(OrderStatus::Paid, 4), (OrderStatus::Shipped, 1)]);
    let json = serde_json::to_value(&counts).expect("serialize");
    assert_eq!(json["PAID"], 4);
    assert_eq!(json["SHIPPED"], 1);
    assert_eq!(json["PAYMENT_FAILED"], 0);
    assert_eq!(json.as_object().map(|o| o.len()), Some(6));
}

#[test]
fn percentage_handles_empty_totals() {
    assert_eq!(percentage(0, 0), 0.0);
    assert_eq!(percentage(1, 4), 25.0);
}

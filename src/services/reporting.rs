//! Calendar-day bucketing for the admin daily reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    dto::reports::{DailyOrderStats, DailyPaymentStats, StatusCounts},
    entity::enums::{OrderStatus, PaymentStatus},
};

/// First day covered by a report of `days` days ending on `today`.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days.max(1) - 1)))
        .unwrap_or(NaiveDate::MIN)
}

/// The `days` calendar days ending on `today`, oldest first.
pub fn window(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    window_start(today, days)
        .iter_days()
        .take_while(|day| *day <= today)
        .collect()
}

pub fn bucket_orders<I>(today: NaiveDate, days: u32, orders: I) -> Vec<DailyOrderStats>
where
    I: IntoIterator<Item = (DateTime<Utc>, OrderStatus, Decimal)>,
{
    let mut buckets: BTreeMap<NaiveDate, DailyOrderStats> = window(today, days)
        .into_iter()
        .map(|date| (date, DailyOrderStats::empty(date)))
        .collect();

    for (created_at, status, total_price) in orders {
        if let Some(bucket) = buckets.get_mut(&created_at.date_naive()) {
            bucket.total += 1;
            bucket.revenue += total_price;
            bucket.by_status.increment(status);
        }
    }

    buckets.into_values().collect()
}

pub fn bucket_payments<I>(today: NaiveDate, days: u32, payments: I) -> Vec<DailyPaymentStats>
where
    I: IntoIterator<Item = (DateTime<Utc>, PaymentStatus, Decimal)>,
{
    let mut buckets: BTreeMap<NaiveDate, DailyPaymentStats> = window(today, days)
        .into_iter()
        .map(|date| (date, DailyPaymentStats::empty(date)))
        .collect();

    for (created_at, status, amount) in payments {
        if let Some(bucket) = buckets.get_mut(&created_at.date_naive()) {
            bucket.total += 1;
            match status {
                PaymentStatus::Success => {
                    bucket.success += 1;
                    bucket.revenue += amount;
                }
                PaymentStatus::Failed => bucket.failed += 1,
                PaymentStatus::Pending => bucket.pending += 1,
            }
        }
    }

    buckets.into_values().collect()
}

pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn status_counts<I>(rows: I) -> StatusCounts
where
    I: IntoIterator<Item = (OrderStatus, i64)>,
{
    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        counts.add(status, count.max(0) as u64);
    }
    counts
}

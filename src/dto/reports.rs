use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    entity::enums::OrderStatus,
    models::ProductSummary,
};

/// Order counts for every status, zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StatusCounts {
    pub pending: u64,
    pub paid: u64,
    pub payment_failed: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

impl StatusCounts {
    fn slot(&mut self, status: OrderStatus) -> &mut u64 {
        match status {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Paid => &mut self.paid,
            OrderStatus::PaymentFailed => &mut self.payment_failed,
            OrderStatus::Shipped => &mut self.shipped,
            OrderStatus::Delivered => &mut self.delivered,
            OrderStatus::Cancelled => &mut self.cancelled,
        }
    }

    pub fn add(&mut self, status: OrderStatus, count: u64) {
        *self.slot(status) += count;
    }

    pub fn increment(&mut self, status: OrderStatus) {
        self.add(status, 1);
    }

    pub fn get(&self, status: OrderStatus) -> u64 {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Paid => self.paid,
            OrderStatus::PaymentFailed => self.payment_failed,
            OrderStatus::Shipped => self.shipped,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductStats {
    pub total: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCounts {
    pub total: u64,
    /// Orders created in the last 30 days.
    pub new_orders: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueStats {
    #[schema(value_type = String)]
    pub total: Decimal,
}

/// Dashboard counters for `GET /admin/statistics`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Statistics {
    pub users: UserStats,
    pub products: ProductStats,
    pub orders: OrderCounts,
    pub revenue: RevenueStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderTotals {
    pub count: u64,
    #[schema(value_type = String)]
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaidOrders {
    #[schema(value_type = String)]
    pub revenue: Decimal,
    /// Share of live orders that are PAID, in percent.
    pub percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LastWeek {
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product: ProductSummary,
    pub total_quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total: OrderTotals,
    pub by_status: StatusCounts,
    pub paid_orders: PaidOrders,
    pub last_week: LastWeek,
    pub top_products: Vec<TopProduct>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyOrderStats {
    pub date: NaiveDate,
    pub total: u64,
    #[schema(value_type = String)]
    pub revenue: Decimal,
    pub by_status: StatusCounts,
}

impl DailyOrderStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            revenue: Decimal::ZERO,
            by_status: StatusCounts::default(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyOrderReport {
    pub days: u32,
    pub data: Vec<DailyOrderStats>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyPaymentStats {
    pub date: NaiveDate,
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub pending: u64,
    #[schema(value_type = String)]
    pub revenue: Decimal,
}

impl DailyPaymentStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            success: 0,
            failed: 0,
            pending: 0,
            revenue: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyPaymentReport {
    pub days: u32,
    pub data: Vec<DailyPaymentStats>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentCounts {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub pending: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatistics {
    pub counts: PaymentCounts,
    #[schema(value_type = String)]
    pub revenue: Decimal,
    #[schema(value_type = String)]
    pub average_amount: Decimal,
    /// Successful payments over all payments, in percent.
    pub success_rate: f64,
    pub last_week: LastWeek,
}

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, LockType, Query};
use uuid::Uuid;

use crate::{
    dto::{
        payments::UpdatePaymentStatusRequest,
        reports::{DailyPaymentReport, LastWeek, PaymentCounts, PaymentStatistics},
    },
    entity::{
        Orders, Payments, Users,
        enums::{OrderStatus, PaymentStatus},
        orders::{ActiveModel as OrderActive, Column as OrderCol},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Model as PaymentModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Payment, PaymentDetail},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, PaymentFilterQuery},
    services::{
        filters::{payment_condition, start_of_day},
        order_service::hydrate_orders,
        reporting::{bucket_payments, percentage, window_start},
    },
    state::AppState,
};

pub async fn list_payments(
    state: &AppState,
    user: &AuthUser,
    query: PaymentFilterQuery,
) -> AppResult<ApiResponse<Vec<PaymentDetail>>> {
    ensure_admin(user)?;
    page_payments(state, payment_condition(&query), query.pagination()).await
}

pub async fn get_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PaymentDetail>> {
    ensure_admin(user)?;
    let payment = Payments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Payment"))?;

    let detail = with_orders(&state.orm, vec![payment])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Payment"))?;
    Ok(ApiResponse::success("Payment", detail, None))
}

/// SUCCESS marks the order PAID and FAILED marks it PAYMENT_FAILED; PENDING leaves it alone.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePaymentStatusRequest,
) -> AppResult<ApiResponse<Payment>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let payment = Payments::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Payment"))?;

    let now = Utc::now();
    let mut active: PaymentActive = payment.into();
    active.status = Set(payload.status);
    active.updated_at = Set(now.into());
    let payment = active.update(&txn).await?;

    let order_status = match payload.status {
        PaymentStatus::Success => Some(OrderStatus::Paid),
        PaymentStatus::Failed => Some(OrderStatus::PaymentFailed),
        PaymentStatus::Pending => None,
    };
    if let Some(order_status) = order_status {
        let order = Orders::find_by_id(payment.order_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;
        let mut order: OrderActive = order.into();
        order.status = Set(order_status);
        order.updated_at = Set(now.into());
        order.update(&txn).await?;
    }
    txn.commit().await?;

    tracing::info!(
        payment_id = %payment.id,
        order_id = %payment.order_id,
        admin_id = %user.user_id,
        status = ?payment.status,
        "payment status changed"
    );
    Ok(ApiResponse::success(
        "Payment status updated",
        Payment::from(payment),
        None,
    ))
}

pub async fn payments_by_user(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<PaymentDetail>>> {
    ensure_admin(user)?;
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let condition = Condition::all().add(
        PaymentCol::OrderId.in_subquery(
            Query::select()
                .column(OrderCol::Id)
                .from(Orders)
                .and_where(OrderCol::UserId.eq(user_id))
                .to_owned(),
        ),
    );
    page_payments(state, condition, pagination).await
}

pub async fn statistics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PaymentStatistics>> {
    ensure_admin(user)?;
    let db = &state.orm;

    let mut counts = PaymentCounts {
        total: 0,
        success: 0,
        failed: 0,
        pending: 0,
    };
    let grouped = Payments::find()
        .select_only()
        .column(PaymentCol::Status)
        .column_as(Expr::col(PaymentCol::Id).count(), "count")
        .group_by(PaymentCol::Status)
        .into_tuple::<(PaymentStatus, i64)>()
        .all(db)
        .await?;
    for (status, count) in grouped {
        let count = count.max(0) as u64;
        counts.total += count;
        match status {
            PaymentStatus::Success => counts.success += count,
            PaymentStatus::Failed => counts.failed += count,
            PaymentStatus::Pending => counts.pending += count,
        }
    }

    let revenue = Payments::find()
        .select_only()
        .column_as(Expr::col(PaymentCol::Amount).sum(), "revenue")
        .filter(PaymentCol::Status.eq(PaymentStatus::Success))
        .into_tuple::<Option<Decimal>>()
        .one(db)
        .await?
        .flatten()
        .unwrap_or_default();

    let average_amount = if counts.success == 0 {
        Decimal::ZERO
    } else {
        (revenue / Decimal::from(counts.success)).round_dp(2)
    };

    let last_week = Payments::find()
        .filter(PaymentCol::CreatedAt.gte(Utc::now() - Duration::days(7)))
        .count(db)
        .await?;

    let data = PaymentStatistics {
        success_rate: percentage(counts.success, counts.total),
        counts,
        revenue,
        average_amount,
        last_week: LastWeek { count: last_week },
    };
    Ok(ApiResponse::success("Payment statistics", data, None))
}

pub async fn daily_report(
    state: &AppState,
    user: &AuthUser,
    days: u32,
) -> AppResult<ApiResponse<DailyPaymentReport>> {
    ensure_admin(user)?;
    let today = Utc::now().date_naive();
    let since = start_of_day(window_start(today, days));

    let rows = Payments::find()
        .select_only()
        .column(PaymentCol::CreatedAt)
        .column(PaymentCol::Status)
        .column(PaymentCol::Amount)
        .filter(PaymentCol::CreatedAt.gte(since))
        .into_tuple::<(DateTimeWithTimeZone, PaymentStatus, Decimal)>()
        .all(&state.orm)
        .await?;

    let data = bucket_payments(
        today,
        days,
        rows.into_iter()
            .map(|(created_at, status, amount)| (created_at.with_timezone(&Utc), status, amount)),
    );
    Ok(ApiResponse::success(
        "Daily payment report",
        DailyPaymentReport { days, data },
        None,
    ))
}

async fn page_payments(
    state: &AppState,
    condition: Condition,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<PaymentDetail>>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Payments::find()
        .filter(condition)
        .order_by_desc(PaymentCol::CreatedAt)
        .order_by_asc(PaymentCol::Id);

    let total = finder.clone().count(&state.orm).await?;
    let payments = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?;
    let items = with_orders(&state.orm, payments).await?;

    Ok(ApiResponse::page(
        "Payments",
        items,
        Meta::new(total, page, limit),
    ))
}

/// Joins each payment with its order, the order's items and the buyer.
async fn with_orders(
    db: &DatabaseConnection,
    payments: Vec<PaymentModel>,
) -> AppResult<Vec<PaymentDetail>> {
    let order_ids: Vec<Uuid> = payments.iter().map(|p| p.order_id).collect();
    let orders = if order_ids.is_empty() {
        Vec::new()
    } else {
        Orders::find()
            .filter(OrderCol::Id.is_in(order_ids))
            .all(db)
            .await?
    };
    let mut details: HashMap<Uuid, _> = hydrate_orders(db, orders, true)
        .await?
        .into_iter()
        .map(|detail| (detail.order.id, detail))
        .collect();

    Ok(payments
        .into_iter()
        .map(|model| {
            let payment = Payment::from(model);
            match details.remove(&payment.order_id) {
                Some(detail) => PaymentDetail {
                    payment,
                    order: Some(detail.order),
                    items: detail.items,
                    user: detail.user,
                },
                None => PaymentDetail {
                    payment,
                    order: None,
                    items: Vec::new(),
                    user: None,
                },
            }
        })
        .collect())
}

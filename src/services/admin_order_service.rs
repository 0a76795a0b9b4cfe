use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::{
    dto::{
        orders::UpdateOrderStatusRequest,
        reports::{
            DailyOrderReport, LastWeek, OrderStatistics, OrderTotals, PaidOrders, TopProduct,
        },
    },
    entity::{
        OrderItems, Orders, Products, Users,
        enums::{EntityState, OrderStatus},
        order_items::Column as OrderItemCol,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Model as OrderModel},
        products::Column as ProdCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{OrderDetail, ProductSummary},
    response::ApiResponse,
    routes::params::{OrderFilterQuery, Pagination},
    services::{
        filters::{live, order_condition, start_of_day},
        order_service::{ensure_cancellable, hydrate_one, page_orders},
        reporting::{bucket_orders, percentage, status_counts, window_start},
    },
    state::AppState,
};

const TOP_PRODUCTS: u64 = 5;

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderFilterQuery,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    ensure_admin(user)?;
    page_orders(state, order_condition(&query), query.pagination(), true).await
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = find_live_order(&state.orm, id).await?;
    let detail = hydrate_one(&state.orm, order, true).await?;
    Ok(ApiResponse::success("Order", detail, None))
}

/// Sets any status, except that shipped or delivered orders cannot become cancelled.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = find_live_order(&state.orm, id).await?;
    if payload.status == OrderStatus::Cancelled {
        ensure_cancellable(order.status)?;
    }

    let previous = order.status;
    let mut active: OrderActive = order.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(
        order_id = %order.id,
        admin_id = %user.user_id,
        from = ?previous,
        to = ?order.status,
        "order status changed"
    );
    let detail = hydrate_one(&state.orm, order, true).await?;
    Ok(ApiResponse::success("Order status updated", detail, None))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = find_live_order(&state.orm, id).await?;

    let mut active: OrderActive = order.into();
    active.state = Set(EntityState::Deleted);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, admin_id = %user.user_id, "order deleted");
    let detail = hydrate_one(&state.orm, order, true).await?;
    Ok(ApiResponse::success("Order deleted", detail, None))
}

pub async fn orders_by_user(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    ensure_admin(user)?;
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let condition = Condition::all()
        .add(OrderCol::UserId.eq(user_id))
        .add(live(OrderCol::State));
    page_orders(state, condition, pagination, true).await
}

/// Live orders containing the product, each counted once.
pub async fn orders_by_product(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    ensure_admin(user)?;
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let condition = Condition::all().add(live(OrderCol::State)).add(
        OrderCol::Id.in_subquery(
            Query::select()
                .column(OrderItemCol::OrderId)
                .from(OrderItems)
                .and_where(OrderItemCol::ProductId.eq(product_id))
                .to_owned(),
        ),
    );
    page_orders(state, condition, pagination, true).await
}

pub async fn statistics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderStatistics>> {
    ensure_admin(user)?;
    let db = &state.orm;

    let total = Orders::find().filter(live(OrderCol::State)).count(db).await?;
    let revenue = sum_total_price(db, Condition::all().add(live(OrderCol::State))).await?;
    let paid_revenue = sum_total_price(
        db,
        Condition::all()
            .add(live(OrderCol::State))
            .add(OrderCol::Status.eq(OrderStatus::Paid)),
    )
    .await?;

    let by_status = status_counts(
        Orders::find()
            .select_only()
            .column(OrderCol::Status)
            .column_as(Expr::col(OrderCol::Id).count(), "count")
            .filter(live(OrderCol::State))
            .group_by(OrderCol::Status)
            .into_tuple::<(OrderStatus, i64)>()
            .all(db)
            .await?,
    );

    let last_week = Orders::find()
        .filter(live(OrderCol::State))
        .filter(OrderCol::CreatedAt.gte(Utc::now() - Duration::days(7)))
        .count(db)
        .await?;

    let data = OrderStatistics {
        total: OrderTotals {
            count: total,
            revenue,
        },
        paid_orders: PaidOrders {
            revenue: paid_revenue,
            percentage: percentage(by_status.get(OrderStatus::Paid), total),
        },
        by_status,
        last_week: LastWeek { count: last_week },
        top_products: top_products(db).await?,
    };
    Ok(ApiResponse::success("Order statistics", data, None))
}

pub async fn daily_report(
    state: &AppState,
    user: &AuthUser,
    days: u32,
) -> AppResult<ApiResponse<DailyOrderReport>> {
    ensure_admin(user)?;
    let today = Utc::now().date_naive();
    let since = start_of_day(window_start(today, days));

    let rows = Orders::find()
        .select_only()
        .column(OrderCol::CreatedAt)
        .column(OrderCol::Status)
        .column(OrderCol::TotalPrice)
        .filter(live(OrderCol::State))
        .filter(OrderCol::CreatedAt.gte(since))
        .into_tuple::<(DateTimeWithTimeZone, OrderStatus, Decimal)>()
        .all(&state.orm)
        .await?;

    let data = bucket_orders(
        today,
        days,
        rows.into_iter()
            .map(|(created_at, status, total)| (created_at.with_timezone(&Utc), status, total)),
    );
    Ok(ApiResponse::success(
        "Daily order report",
        DailyOrderReport { days, data },
        None,
    ))
}

async fn find_live_order(db: &DatabaseConnection, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .filter(live(OrderCol::State))
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))
}

async fn sum_total_price(db: &DatabaseConnection, condition: Condition) -> AppResult<Decimal> {
    Ok(Orders::find()
        .select_only()
        .column_as(Expr::col(OrderCol::TotalPrice).sum(), "revenue")
        .filter(condition)
        .into_tuple::<Option<Decimal>>()
        .one(db)
        .await?
        .flatten()
        .unwrap_or_default())
}

/// Best sellers by summed quantity over live orders.
async fn top_products(db: &DatabaseConnection) -> AppResult<Vec<TopProduct>> {
    let ranked = OrderItems::find()
        .select_only()
        .column(OrderItemCol::ProductId)
        .column_as(Expr::col(OrderItemCol::Quantity).sum(), "total_quantity")
        .filter(
            OrderItemCol::OrderId.in_subquery(
                Query::select()
                    .column(OrderCol::Id)
                    .from(Orders)
                    .and_where(live(OrderCol::State))
                    .to_owned(),
            ),
        )
        .group_by(OrderItemCol::ProductId)
        .order_by_desc(Expr::col(OrderItemCol::Quantity).sum())
        .limit(TOP_PRODUCTS)
        .into_tuple::<(Uuid, i64)>()
        .all(db)
        .await?;

    let ids: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();
    let mut products: HashMap<Uuid, ProductSummary> = if ids.is_empty() {
        HashMap::new()
    } else {
        Products::find()
            .filter(ProdCol::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, ProductSummary::from(p)))
            .collect()
    };

    Ok(ranked
        .into_iter()
        .filter_map(|(id, total_quantity)| {
            products.remove(&id).map(|product| TopProduct {
                product,
                total_quantity,
            })
        })
        .collect())
}

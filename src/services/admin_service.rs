use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    dto::{
        reports::{OrderCounts, ProductStats, RevenueStats, Statistics, UserStats},
        users::{BlockUserRequest, UserWithOrderCount},
    },
    entity::{
        Orders, Payments, Products, Users,
        enums::PaymentStatus,
        orders::Column as OrderCol,
        payments::Column as PaymentCol,
        products::Column as ProdCol,
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{auth_service::find_live_user, filters::live},
    state::AppState,
};

/// Headline counters for the admin dashboard.
pub async fn statistics(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Statistics>> {
    ensure_admin(user)?;
    let db = &state.orm;
    let month_ago = Utc::now() - Duration::days(30);

    let users_total = Users::find().filter(live(UserCol::State)).count(db).await?;
    let users_active = Users::find()
        .filter(live(UserCol::State))
        .filter(UserCol::IsActive.eq(true))
        .count(db)
        .await?;
    let products_total = Products::find().filter(live(ProdCol::State)).count(db).await?;
    let orders_total = Orders::find().filter(live(OrderCol::State)).count(db).await?;
    let new_orders = Orders::find()
        .filter(live(OrderCol::State))
        .filter(OrderCol::CreatedAt.gte(month_ago))
        .count(db)
        .await?;

    let revenue = Payments::find()
        .select_only()
        .column_as(Expr::col(PaymentCol::Amount).sum(), "revenue")
        .filter(PaymentCol::Status.eq(PaymentStatus::Success))
        .into_tuple::<Option<Decimal>>()
        .one(db)
        .await?
        .flatten()
        .unwrap_or_default();

    let data = Statistics {
        users: UserStats {
            total: users_total,
            active: users_active,
        },
        products: ProductStats {
            total: products_total,
        },
        orders: OrderCounts {
            total: orders_total,
            new_orders,
        },
        revenue: RevenueStats { total: revenue },
    };
    Ok(ApiResponse::success("Statistics", data, None))
}

/// Live users, newest first, each with the number of live orders they placed.
pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<UserWithOrderCount>>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find()
        .filter(live(UserCol::State))
        .order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await?;
    let users = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let counts: HashMap<Uuid, i64> = if ids.is_empty() {
        HashMap::new()
    } else {
        Orders::find()
            .select_only()
            .column(OrderCol::UserId)
            .column_as(Expr::col(OrderCol::Id).count(), "orders_count")
            .filter(OrderCol::UserId.is_in(ids))
            .filter(live(OrderCol::State))
            .group_by(OrderCol::UserId)
            .into_tuple::<(Uuid, i64)>()
            .all(&state.orm)
            .await?
            .into_iter()
            .collect()
    };

    let items = users
        .into_iter()
        .map(|model| {
            let orders_count = counts.get(&model.id).copied().unwrap_or(0).max(0) as u64;
            UserWithOrderCount {
                user: User::from(model),
                orders_count,
            }
        })
        .collect();

    Ok(ApiResponse::page(
        "Users",
        items,
        Meta::new(total, page, limit),
    ))
}

pub async fn set_user_active(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: BlockUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    if id == user.user_id && !payload.is_active {
        return Err(AppError::BadRequest("Admins cannot block themselves".into()));
    }
    let existing = find_live_user(&state.orm, id).await?;

    let mut active: UserActive = existing.into();
    active.is_active = Set(payload.is_active);
    let updated = active.update(&state.orm).await?;

    tracing::info!(
        user_id = %updated.id,
        admin_id = %user.user_id,
        is_active = updated.is_active,
        "user activation changed"
    );
    let message = if updated.is_active {
        "User unblocked"
    } else {
        "User blocked"
    };
    Ok(ApiResponse::success(message, User::from(updated), None))
}

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::UpdateOrderStatusRequest,
        reports::{DailyOrderReport, OrderStatistics},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderDetail,
    response::ApiResponse,
    routes::params::{OrderFilterQuery, Pagination, ReportQuery},
    services::admin_order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/statistics", get(statistics))
        .route("/daily-report", get(daily_report))
        .route("/by-user/{user_id}", get(orders_by_user))
        .route("/by-product/{product_id}", get(orders_by_product))
        .route("/{id}", get(get_order).delete(delete_order))
        .route("/{id}/status", put(update_status))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Items per page, default 10"),
        ("status" = Option<String>, Query, description = "Order status"),
        ("dateFrom" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("dateTo" = Option<String>, Query, description = "Last day, YYYY-MM-DD, inclusive"),
        ("userId" = Option<Uuid>, Query, description = "Orders of one user")
    ),
    responses(
        (status = 200, description = "Filtered orders with user, items and payment", body = ApiResponse<Vec<OrderDetail>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderFilterQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    let resp = admin_order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/statistics",
    responses(
        (status = 200, description = "Order rollups", body = ApiResponse<OrderStatistics>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderStatistics>>> {
    let resp = admin_order_service::statistics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/daily-report",
    params(("days" = Option<u32>, Query, description = "Trailing days including today, default 30")),
    responses(
        (status = 200, description = "One zero-filled entry per day, oldest first", body = ApiResponse<DailyOrderReport>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn daily_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<DailyOrderReport>>> {
    let resp = admin_order_service::daily_report(&state, &user, query.days()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/by-user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "Orders of the user", body = ApiResponse<Vec<OrderDetail>>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn orders_by_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    let resp = admin_order_service::orders_by_user(&state, &user, user_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/by-product/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "Orders containing the product", body = ApiResponse<Vec<OrderDetail>>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn orders_by_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    let resp =
        admin_order_service::orders_by_product(&state, &user, product_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with user, items and payment", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = admin_order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Cannot cancel shipped or delivered orders"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = admin_order_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order soft-deleted", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = admin_order_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}

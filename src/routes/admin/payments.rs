use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        payments::UpdatePaymentStatusRequest,
        reports::{DailyPaymentReport, PaymentStatistics},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Payment, PaymentDetail},
    response::ApiResponse,
    routes::params::{Pagination, PaymentFilterQuery, ReportQuery},
    services::admin_payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments))
        .route("/statistics", get(statistics))
        .route("/daily-report", get(daily_report))
        .route("/by-user/{user_id}", get(payments_by_user))
        .route("/{id}", get(get_payment))
        .route("/{id}/status", put(update_status))
}

#[utoipa::path(
    get,
    path = "/api/admin/payments",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Items per page, default 10"),
        ("status" = Option<String>, Query, description = "PENDING, SUCCESS or FAILED"),
        ("dateFrom" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("dateTo" = Option<String>, Query, description = "Last day, YYYY-MM-DD, inclusive")
    ),
    responses(
        (status = 200, description = "Filtered payments with their orders", body = ApiResponse<Vec<PaymentDetail>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PaymentFilterQuery>,
) -> AppResult<Json<ApiResponse<Vec<PaymentDetail>>>> {
    let resp = admin_payment_service::list_payments(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/payments/statistics",
    responses(
        (status = 200, description = "Payment rollups", body = ApiResponse<PaymentStatistics>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payments"
)]
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentStatistics>>> {
    let resp = admin_payment_service::statistics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/payments/daily-report",
    params(("days" = Option<u32>, Query, description = "Trailing days including today, default 30")),
    responses(
        (status = 200, description = "One zero-filled entry per day, oldest first", body = ApiResponse<DailyPaymentReport>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payments"
)]
pub async fn daily_report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<DailyPaymentReport>>> {
    let resp = admin_payment_service::daily_report(&state, &user, query.days()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/payments/by-user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "Payments of the user", body = ApiResponse<Vec<PaymentDetail>>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payments"
)]
pub async fn payments_by_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<PaymentDetail>>>> {
    let resp =
        admin_payment_service::payments_by_user(&state, &user, user_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment with order, items and user", body = ApiResponse<PaymentDetail>),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentDetail>>> {
    let resp = admin_payment_service::get_payment(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/payments/{id}/status",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Status changed; the order follows SUCCESS and FAILED", body = ApiResponse<Payment>),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payments"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = admin_payment_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

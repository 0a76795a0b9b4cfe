use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        reports::Statistics,
        users::{BlockUserRequest, UserWithOrderCount},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::Pagination,
    services::admin_service,
    state::AppState,
};

pub mod categories;
pub mod orders;
pub mod payments;
pub mod products;

/// Every route here requires an ADMIN principal; the services enforce it.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/statistics", get(statistics))
        .route("/users", get(list_users))
        .route("/users/{id}/block", put(set_user_active))
        .nest("/categories", categories::router())
        .nest("/products", products::router(max_upload_bytes))
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
}

#[utoipa::path(
    get,
    path = "/api/admin/statistics",
    responses(
        (status = 200, description = "Dashboard counters", body = ApiResponse<Statistics>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Statistics>>> {
    let resp = admin_service::statistics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "Users with order counts", body = ApiResponse<Vec<UserWithOrderCount>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<UserWithOrderCount>>>> {
    let resp = admin_service::list_users(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/block",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = BlockUserRequest,
    responses(
        (status = 200, description = "Block or unblock a user", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_user_active(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BlockUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::set_user_active(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

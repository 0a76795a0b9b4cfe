use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::users::UpdateUserRequest,
    entity::{
        Users,
        enums::EntityState,
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::auth_service::{find_live_user, hash_password},
    state::AppState,
};

/// Users may act on their own account; admins on any account.
pub fn ensure_self_or_admin(user: &AuthUser, target: Uuid) -> AppResult<()> {
    if user.user_id == target || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_self_or_admin(user, id)?;
    payload.validate()?;
    let existing = find_live_user(&state.orm, id).await?;

    let mut active: UserActive = existing.clone().into();
    if let Some(email) = payload.email.map(|e| e.trim().to_lowercase()) {
        if email != existing.email {
            let taken = Users::find()
                .filter(UserCol::Email.eq(email.as_str()))
                .filter(UserCol::Id.ne(id))
                .one(&state.orm)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("Email already in use".into()));
            }
            active.email = Set(email);
        }
    }
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(&password)?);
    }

    let updated = active.update(&state.orm).await?;
    tracing::info!(user_id = %updated.id, actor_id = %user.user_id, "user updated");
    Ok(ApiResponse::success("User updated", User::from(updated), None))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_self_or_admin(user, id)?;
    let existing = find_live_user(&state.orm, id).await?;

    let mut active: UserActive = existing.into();
    active.state = Set(EntityState::Deleted);
    let deleted = active.update(&state.orm).await?;

    tracing::info!(user_id = %deleted.id, actor_id = %user.user_id, "user deleted");
    Ok(ApiResponse::success("User deleted", User::from(deleted), None))
}

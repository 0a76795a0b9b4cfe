use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    dto::{
        auth::{AuthResponse, Claims, LoginRequest, RefreshRequest, RegisterRequest, TokenKind},
        users::Profile,
    },
    entity::{
        Orders, Users,
        enums::{EntityState, Role},
        orders::Column as OrderCol,
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, User},
    response::ApiResponse,
    services::filters::live,
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn encode_token(
    secret: &str,
    user: &UserModel,
    kind: TokenKind,
    ttl_secs: i64,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(ttl_secs))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        kind,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Verifies signature and expiry, then rejects tokens of the wrong kind.
pub fn decode_token(secret: &str, token: &str, expected: TokenKind) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    if decoded.claims.kind != expected {
        return Err(AppError::Unauthorized("Invalid token type".into()));
    }
    Ok(decoded.claims)
}

fn issue_tokens(config: &AppConfig, user: UserModel) -> AppResult<AuthResponse> {
    let access_token = encode_token(
        &config.jwt_secret,
        &user,
        TokenKind::Access,
        config.access_token_ttl,
    )?;
    let refresh_token = encode_token(
        &config.jwt_secret,
        &user,
        TokenKind::Refresh,
        config.refresh_token_ttl,
    )?;
    Ok(AuthResponse {
        user: User::from(user),
        access_token,
        refresh_token,
        expires_in: config.access_token_ttl,
    })
}

pub async fn find_live_user(db: &DatabaseConnection, id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .filter(live(UserCol::State))
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn register(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    payload.validate()?;
    let RegisterRequest {
        email,
        password,
        name,
    } = payload;
    let email = email.trim().to_lowercase();

    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists".into(),
        ));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        name: Set(name.trim().to_string()),
        role: Set(Role::User),
        is_active: Set(true),
        state: Set(EntityState::Active),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, "user registered");
    let data = issue_tokens(&state.config, user)?;
    Ok(ApiResponse::success("User registered", data, None))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<AuthResponse>> {
    payload.validate()?;
    let email = payload.email.trim().to_lowercase();

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .filter(live(UserCol::State))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("User is blocked".into()));
    }

    tracing::info!(user_id = %user.id, "user logged in");
    let data = issue_tokens(&state.config, user)?;
    Ok(ApiResponse::success("Logged in", data, None))
}

pub async fn refresh(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    payload.validate()?;
    let claims = decode_token(
        &state.config.jwt_secret,
        &payload.refresh_token,
        TokenKind::Refresh,
    )?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    let user = Users::find_by_id(user_id)
        .filter(UserCol::IsActive.eq(true))
        .filter(live(UserCol::State))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found or inactive".into()))?;

    let data = issue_tokens(&state.config, user)?;
    Ok(ApiResponse::success("Token refreshed", data, None))
}

pub async fn profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let account = find_live_user(&state.orm, user.user_id).await?;
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(account.id))
        .filter(live(OrderCol::State))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let data = Profile {
        user: User::from(account),
        orders,
    };
    Ok(ApiResponse::success("Profile", data, None))
}

/// Creates the configured admin account when no user holds that email yet.
pub async fn ensure_admin_account(db: &DatabaseConnection, config: &AppConfig) -> AppResult<()> {
    let email = config.admin_email.trim().to_lowercase();
    let existing = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let admin = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&config.admin_password)?),
        name: Set(config.admin_name.clone()),
        role: Set(Role::Admin),
        is_active: Set(true),
        state: Set(EntityState::Active),
        created_at: NotSet,
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = %admin.id, email = %admin.email, "admin account created");
    Ok(())
}

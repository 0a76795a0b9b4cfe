use axum::http::StatusCode;
use axum_bookstore_api::{
    config::parse_duration_secs,
    dto::auth::{RegisterRequest, TokenKind},
    entity::{
        enums::{EntityState, Role},
        users,
    },
    error::AppError,
    middleware::auth::{AuthUser, bearer_token, ensure_admin},
    services::{
        auth_service::{decode_token, encode_token, hash_password, verify_password},
        user_service::ensure_self_or_admin,
    },
};
use chrono::Utc;
use sea_orm::DbErr;
use uuid::Uuid;
use validator::Validate;

const SECRET: &str = "test-secret";

fn sample_user(role: Role) -> users::Model {
    users::Model {
        id: Uuid::new_v4(),
        email: "reader@example.com".into(),
        password_hash: String::new(),
        name: "Reader".into(),
        role,
        is_active: true,
        state: EntityState::Active,
        created_at: Utc::now().into(),
    }
}

#[test]
fn access_token_round_trip() {
    let user = sample_user(Role::Admin);
    let token = encode_token(SECRET, &user, TokenKind::Access, 900).expect("encode");
    let claims = decode_token(SECRET, &token, TokenKind::Access).expect("decode");
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.email, user.email);
    assert_eq!(claims.role, Role::Admin);
}

#[test]
fn refresh_token_is_not_an_access_token() {
    let user = sample_user(Role::User);
    let token = encode_token(SECRET, &user, TokenKind::Refresh, 900).expect("encode");
    let err = decode_token(SECRET, &token, TokenKind::Access).expect_err("wrong kind");
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[test]
fn token_signed_with_another_secret_is_rejected() {
    let user = sample_user(Role::User);
    let token = encode_token("other", &user, TokenKind::Access, 900).expect("encode");
    assert!(decode_token(SECRET, &token, TokenKind::Access).is_err());
}

#[test]
fn bearer_scheme_is_required() {
    assert_eq!(bearer_token("Bearer abc.def").ok(), Some("abc.def"));
    assert!(bearer_token("Basic abc").is_err());
    assert!(bearer_token("Bearer   ").is_err());
}

#[test]
fn password_hash_verifies() {
    let hash = hash_password("Secret123").expect("hash");
    assert!(verify_password("Secret123", &hash).expect("verify"));
    assert!(!verify_password("secret123", &hash).expect("verify"));
}

#[test]
fn register_validation() {
    let valid = RegisterRequest {
        email: "a@b.io".into(),
        password: "Abc123".into(),
        name: "Al".into(),
    };
    assert!(valid.validate().is_ok());

    let weak = RegisterRequest {
        password: "abcdef".into(),
        ..valid_copy(&valid)
    };
    assert!(weak.validate().is_err());

    let bad_email = RegisterRequest {
        email: "not-an-email".into(),
        ..valid_copy(&valid)
    };
    assert!(bad_email.validate().is_err());

    let short_name = RegisterRequest {
        name: "A".into(),
        ..valid_copy(&valid)
    };
    assert!(short_name.validate().is_err());
}

fn valid_copy(req: &RegisterRequest) -> RegisterRequest {
    RegisterRequest {
        email: req.email.clone(),
        password: req.password.clone(),
        name: req.name.clone(),
    }
}

#[test]
fn role_checks() {
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        email: "admin@example.com".into(),
        role: Role::Admin,
    };
    let user = AuthUser {
        user_id: Uuid::new_v4(),
        email: "user@example.com".into(),
        role: Role::User,
    };

    assert!(ensure_admin(&admin).is_ok());
    assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
    assert!(ensure_self_or_admin(&user, user.user_id).is_ok());
    assert!(ensure_self_or_admin(&admin, user.user_id).is_ok());
    assert!(matches!(
        ensure_self_or_admin(&user, admin.user_id),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn duration_parsing() {
    assert_eq!(parse_duration_secs("15m"), 900);
    assert_eq!(parse_duration_secs("7d"), 7 * 24 * 3600);
    assert_eq!(parse_duration_secs("30s"), 30);
    assert_eq!(parse_duration_secs("2h"), 7200);
    assert_eq!(parse_duration_secs("soon"), 900);
    assert_eq!(parse_duration_secs(""), 900);
    assert_eq!(parse_duration_secs("10w"), 900);
}

#[test]
fn error_kinds_map_to_status_codes() {
    assert_eq!(AppError::not_found("Order").status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::not_found("Order").to_string(), "Order not found");
    assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::InvalidState("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        AppError::from(DbErr::Custom("boom".into())).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::from(DbErr::RecordNotFound("orders".into())).status_code(),
        StatusCode::NOT_FOUND
    );
}

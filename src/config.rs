use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl: i64,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let access_token_ttl = parse_duration_secs(
            &env::var("JWT_ACCESS_EXPIRATION").unwrap_or_else(|_| "15m".to_string()),
        );
        let refresh_token_ttl = parse_duration_secs(
            &env::var("JWT_REFRESH_EXPIRATION").unwrap_or_else(|_| "7d".to_string()),
        );
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10 * 1024 * 1024);

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            upload_dir,
            max_upload_bytes,
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin123".to_string()),
            admin_name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
        })
    }
}

const DEFAULT_TTL_SECS: i64 = 900;

/// Parses lifetimes written as `<n><unit>` where unit is one of `s`, `m`, `h`, `d`.
/// Anything else falls back to fifteen minutes.
pub fn parse_duration_secs(raw: &str) -> i64 {
    let raw = raw.trim();
    let Some(unit) = raw.chars().last() else {
        return DEFAULT_TTL_SECS;
    };
    let value = match raw[..raw.len() - unit.len_utf8()].parse::<i64>() {
        Ok(v) if v > 0 => v,
        _ => return DEFAULT_TTL_SECS,
    };
    match unit {
        's' => value,
        'm' => value * 60,
        'h' => value * 60 * 60,
        'd' => value * 24 * 60 * 60,
        _ => DEFAULT_TTL_SECS,
    }
}

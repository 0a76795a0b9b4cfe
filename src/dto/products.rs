use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppError, upload::UploadedFile};

/// Fields collected from a multipart product form; absent parts stay `None`.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub category_ids: Option<Vec<Uuid>>,
    pub image: Option<UploadedFile>,
}

/// Documents the multipart body accepted by the admin product endpoints.
#[allow(dead_code)]
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpload {
    pub title: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub description: String,
    pub category_ids: Vec<Uuid>,
    #[schema(value_type = String, format = Binary)]
    pub image: String,
}

pub fn parse_price(raw: &str) -> Result<Decimal, AppError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| AppError::BadRequest("Price must be a number".into()))
}

/// Accepts a single id, a comma separated list, or a JSON-style `["a","b"]` array.
pub fn parse_category_ids(raw: &str) -> Result<Vec<Uuid>, AppError> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|part| part.trim().trim_matches('"'))
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part)
                .map_err(|_| AppError::BadRequest(format!("Invalid category id: {part}")))
        })
        .collect()
}

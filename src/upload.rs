use std::path::Path;

use anyhow::Context;
use axum::body::Bytes;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A file part pulled out of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Lower-cased extension including the dot, or empty when the name has none
/// or the extension is not plain alphanumerics.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Writes the file under `<upload_dir>/<folder>/<uuid><ext>` and returns the
/// public path `/uploads/<folder>/<uuid><ext>`.
pub async fn store_file(upload_dir: &str, folder: &str, file: &UploadedFile) -> AppResult<String> {
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest("File not found".into()));
    }

    let stored_name = format!("{}{}", Uuid::new_v4(), file_extension(&file.file_name));
    let dir = Path::new(upload_dir).join(folder);

    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create upload directory {}", dir.display()))?;
    tokio::fs::write(dir.join(&stored_name), &file.bytes)
        .await
        .with_context(|| format!("failed to write upload {stored_name}"))?;

    tracing::debug!(
        file = %stored_name,
        size = file.bytes.len(),
        content_type = file.content_type.as_deref().unwrap_or("-"),
        "stored upload"
    );

    Ok(format!("/uploads/{folder}/{stored_name}"))
}

// src/handlers/files.rs

use std::path::Path as FsPath;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{config::Config, error::AppError};

/// Upload size cap for a single image.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Stores the multipart field `file` in the upload directory.
///
/// Returns the generated key, which items keep as their `image` and which is
/// served back under `/files/{key}`.
pub async fn upload_file(
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let key = storage_key(field.file_name());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        tokio::fs::write(config.upload_dir.join(&key), &data)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store upload {}: {:?}", key, e);
                AppError::InternalServerError(e.to_string())
            })?;

        tracing::info!("Stored upload {} ({} bytes)", key, data.len());
        return Ok((StatusCode::CREATED, Json(json!({ "url": key }))));
    }

    Err(AppError::BadRequest("Missing multipart field 'file'".to_string()))
}

/// Random key for an upload, keeping a short alphanumeric extension if the
/// client sent one.
fn storage_key(file_name: Option<&str>) -> String {
    let id = Uuid::new_v4();
    let extension = file_name
        .and_then(|name| FsPath::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", id, ext.to_ascii_lowercase()),
        None => id.to_string(),
    }
}

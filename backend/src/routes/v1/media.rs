//! Media upload endpoints
//!
//! Multipart uploads for cover and avatar images. Type and size are
//! validated here before any storage call; the upload itself never fails,
//! degrading to a placeholder URL that is surfaced through the `degraded`
//! flag.

use std::sync::Arc;

use axum::{extract::Multipart, http::StatusCode, Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    media_storage::{MediaStorage, UploadFile},
    middleware::AuthenticatedUser,
    types::AppError,
};

/// Maximum accepted file size (5 MiB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted image MIME types
const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Response for a media upload
#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    /// Public URL of the stored image, or a placeholder on degradation
    pub url: String,
    /// Whether the URL is a placeholder rather than the uploaded file
    pub degraded: bool,
}

/// Uploads a book cover image
///
/// # Errors
///
/// Returns 400 for malformed multipart bodies, missing file fields or
/// unsupported image types, 413 for files over 5 MiB
#[instrument(skip_all)]
pub async fn upload_cover(
    _user: AuthenticatedUser,
    Extension(media_storage): Extension<Arc<MediaStorage>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let file = read_upload_file(multipart).await?;
    let outcome = media_storage.upload_book_cover(&file).await;

    Ok(Json(UploadResponse {
        degraded: outcome.is_degraded(),
        url: outcome.url().to_string(),
    }))
}

/// Uploads an avatar image
///
/// # Errors
///
/// Returns 400 for malformed multipart bodies, missing file fields or
/// unsupported image types, 413 for files over 5 MiB
#[instrument(skip_all)]
pub async fn upload_avatar(
    _user: AuthenticatedUser,
    Extension(media_storage): Extension<Arc<MediaStorage>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let file = read_upload_file(multipart).await?;
    let outcome = media_storage.upload_avatar(&file).await;

    Ok(Json(UploadResponse {
        degraded: outcome.is_degraded(),
        url: outcome.url().to_string(),
    }))
}

/// Reads and validates the `file` field of a multipart upload
async fn read_upload_file(mut multipart: Multipart) -> Result<UploadFile, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();

        let content_type = field
            .content_type()
            .map(ToString::to_string)
            .ok_or_else(|| {
                AppError::new(
                    StatusCode::BAD_REQUEST,
                    "missing_content_type",
                    "File field must declare a content type",
                    false,
                )
            })?;

        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "unsupported_media_type",
                "Only JPEG, PNG, GIF and WebP images are accepted",
                false,
            ));
        }

        let bytes = field.bytes().await?;

        if bytes.len() > MAX_FILE_SIZE {
            return Err(AppError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                "File exceeds the 5 MiB limit",
                false,
            ));
        }

        return Ok(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::new(
        StatusCode::BAD_REQUEST,
        "missing_file",
        "Multipart body must contain a file field",
        false,
    ))
}

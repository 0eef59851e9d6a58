//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use backend_storage::{
    book_like::BookLikeStorageError, book_share::BookShareStorageError,
    comment::CommentStorageError, profile::ProfileStorageError,
};
use schemars::JsonSchema;
use serde::Serialize;

/// API error response envelope that matches mobile client expectations
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert multipart parsing errors to application errors
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!("Multipart parsing error: {:?}", err);
        // A body over the request limit surfaces here before the per-file
        // size check can run; keep the status consistent with it
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                "File exceeds the 5 MiB limit",
                false,
            );
        }
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_multipart",
            "Request body is not valid multipart form data",
            false,
        )
    }
}

/// Convert book share storage errors to application errors
impl From<BookShareStorageError> for AppError {
    fn from(err: BookShareStorageError) -> Self {
        match &err {
            BookShareStorageError::ShareNotFound => Self::new(
                StatusCode::NOT_FOUND,
                "share_not_found",
                "Book share does not exist",
                false,
            ),
            _ => {
                tracing::error!("Book share storage error: {err:?}");
                storage_error()
            }
        }
    }
}

/// Convert book like storage errors to application errors
impl From<BookLikeStorageError> for AppError {
    fn from(err: BookLikeStorageError) -> Self {
        match &err {
            BookLikeStorageError::AlreadyLiked => Self::new(
                StatusCode::CONFLICT,
                "already_liked",
                "Share is already liked by this user",
                false,
            ),
            _ => {
                tracing::error!("Book like storage error: {err:?}");
                storage_error()
            }
        }
    }
}

/// Convert comment storage errors to application errors
impl From<CommentStorageError> for AppError {
    fn from(err: CommentStorageError) -> Self {
        tracing::error!("Comment storage error: {err:?}");
        storage_error()
    }
}

/// Convert profile storage errors to application errors
impl From<ProfileStorageError> for AppError {
    fn from(err: ProfileStorageError) -> Self {
        tracing::error!("Profile storage error: {err:?}");
        storage_error()
    }
}

const fn storage_error() -> AppError {
    AppError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_error",
        "Internal storage error",
        true,
    )
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}

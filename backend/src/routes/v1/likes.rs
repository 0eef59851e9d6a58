//! Like endpoints
//!
//! Likes keep one row per (share, user) pair plus a denormalized counter on
//! the share row, maintained atomically so concurrent toggles cannot drift.

use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use backend_storage::{
    book_like::{BookLike, BookLikeStore},
    book_share::BookShareStore,
};
use chrono::Utc;
use schemars::JsonSchema;
use serde::Serialize;

use super::shares::share_not_found;
use crate::{middleware::AuthenticatedUser, types::AppError};

/// The caller's like state after the operation
#[derive(Debug, Serialize, JsonSchema)]
pub struct LikeStatusResponse {
    /// Whether the caller now likes the share
    pub liked: bool,
    /// The share's like count after the operation
    pub like_count: i64,
}

/// Likes a share
///
/// # Errors
///
/// Returns 404 if the share does not exist, 409 if already liked, 500 on
/// storage failure
pub async fn like_share(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Path(id): Path<String>,
) -> Result<Json<LikeStatusResponse>, AppError> {
    book_shares.get_by_id(&id).await?.ok_or_else(share_not_found)?;

    let like = BookLike {
        book_share_id: id.clone(),
        user_id: user.user_id,
        created_at: Utc::now().timestamp_millis(),
    };
    book_likes.insert(&like).await?;

    // Echo the counter the atomic ADD produced, not the pre-insert read,
    // so concurrent toggles cannot report a stale count
    let like_count = book_shares.add_to_like_count(&id, 1).await?;

    Ok(Json(LikeStatusResponse {
        liked: true,
        like_count,
    }))
}

/// Removes the caller's like from a share
///
/// # Errors
///
/// Returns 404 if the share does not exist or is not liked by the caller,
/// 500 on storage failure
pub async fn unlike_share(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Path(id): Path<String>,
) -> Result<Json<LikeStatusResponse>, AppError> {
    book_shares.get_by_id(&id).await?.ok_or_else(share_not_found)?;

    if book_likes.get_one(&id, &user.user_id).await?.is_none() {
        return Err(AppError::new(
            StatusCode::NOT_FOUND,
            "not_liked",
            "Share is not liked by this user",
            false,
        ));
    }

    book_likes.delete(&id, &user.user_id).await?;
    let like_count = book_shares.add_to_like_count(&id, -1).await?;

    Ok(Json(LikeStatusResponse {
        liked: false,
        like_count,
    }))
}

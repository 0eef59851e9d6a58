//! Comment endpoints

use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use axum_valid::Valid;
use backend_storage::{
    book_share::BookShareStore,
    comment::{Comment, CommentStore},
    profile::ProfileStore,
};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::profile::ProfileResponse;
use super::shares::share_not_found;
use crate::{middleware::AuthenticatedUser, types::AppError};

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateCommentRequest {
    /// Comment text
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

/// A comment with its author profile
#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentResponse {
    /// Comment ID
    pub id: String,
    /// Commented share ID
    pub book_share_id: String,
    /// Authoring user ID
    pub user_id: String,
    /// Comment text
    pub content: String,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Author profile, if one exists
    pub profile: Option<ProfileResponse>,
}

/// Response for listing comments
#[derive(Debug, Serialize, JsonSchema)]
pub struct ListCommentsResponse {
    /// Comments, oldest first
    pub comments: Vec<CommentResponse>,
}

/// Response for deleting a comment
#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentDeletedResponse {
    /// Always true on success
    pub deleted: bool,
}

/// Lists comments on a share, oldest first, with author profiles
///
/// # Errors
///
/// Returns 404 if the share does not exist, 500 on storage failure
pub async fn list_comments(
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(comments): Extension<Arc<dyn CommentStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
    Path(id): Path<String>,
) -> Result<Json<ListCommentsResponse>, AppError> {
    if book_shares.get_by_id(&id).await?.is_none() {
        return Err(share_not_found());
    }

    let mut rows = comments.list_by_share(&id).await?;
    rows.sort_by_key(|comment| comment.created_at);

    let mut responses = Vec::with_capacity(rows.len());
    for comment in rows {
        let profile = profiles.get(&comment.user_id).await?.map(Into::into);
        responses.push(CommentResponse {
            profile,
            id: comment.id,
            book_share_id: comment.book_share_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at,
        });
    }

    Ok(Json(ListCommentsResponse {
        comments: responses,
    }))
}

/// Adds a comment to a share
///
/// # Errors
///
/// Returns 401 without a session, 404 if the share does not exist, 500 on
/// storage failure
pub async fn create_comment(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(comments): Extension<Arc<dyn CommentStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<CreateCommentRequest>>,
) -> Result<Json<CommentResponse>, AppError> {
    if book_shares.get_by_id(&id).await?.is_none() {
        return Err(share_not_found());
    }

    let comment = Comment {
        book_share_id: id,
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        content: payload.content,
        created_at: Utc::now().timestamp_millis(),
    };
    comments.insert(&comment).await?;

    let profile = profiles.get(&comment.user_id).await?.map(Into::into);

    Ok(Json(CommentResponse {
        profile,
        id: comment.id,
        book_share_id: comment.book_share_id,
        user_id: comment.user_id,
        content: comment.content,
        created_at: comment.created_at,
    }))
}

/// Deletes a comment; author only
///
/// # Errors
///
/// Returns 401 without a session, 403 for non-authors, 404 if the comment
/// does not exist, 500 on storage failure
pub async fn delete_comment(
    user: AuthenticatedUser,
    Extension(comments): Extension<Arc<dyn CommentStore>>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<CommentDeletedResponse>, AppError> {
    let comment = comments.get_one(&id, &comment_id).await?.ok_or_else(|| {
        AppError::new(
            StatusCode::NOT_FOUND,
            "comment_not_found",
            "Comment does not exist",
            false,
        )
    })?;

    if comment.user_id != user.user_id {
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            "not_author",
            "Only the comment author may delete it",
            false,
        ));
    }

    comments.delete(&id, &comment_id).await?;

    Ok(Json(CommentDeletedResponse { deleted: true }))
}

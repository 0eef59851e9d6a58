//! Book share endpoints

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use axum_valid::Valid;
use backend_storage::{
    book_like::BookLikeStore,
    book_share::{BookShare, BookShareStore, BookShareUpdate},
    comment::CommentStore,
    profile::ProfileStore,
};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::profile::ProfileResponse;
use crate::{middleware::AuthenticatedUser, types::AppError};

/// Sort order for share listings
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Most recent first
    #[default]
    Newest,
    /// Most liked first
    Popular,
}

/// Query parameters for listing shares
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListSharesParams {
    /// Case-insensitive substring filter over title, author and review
    pub search: Option<String>,
    /// Sort order, defaults to newest
    pub sort: Option<SortOption>,
}

/// Request body for creating a share
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateShareRequest {
    /// Book title
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Book author
    #[validate(length(min = 1, max = 200))]
    pub author: String,
    /// Review text
    #[validate(length(min = 1, max = 5000))]
    pub review: String,
    /// Cover image URL, typically from `POST /v1/media/covers`
    #[validate(url)]
    pub cover_url: Option<String>,
}

/// Request body for updating a share
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateShareRequest {
    /// New book title
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// New book author
    #[validate(length(min = 1, max = 200))]
    pub author: String,
    /// New review text
    #[validate(length(min = 1, max = 5000))]
    pub review: String,
    /// New cover image URL; omit to remove the cover
    #[validate(url)]
    pub cover_url: Option<String>,
}

/// A share with its author profile and the caller's like state
#[derive(Debug, Serialize, JsonSchema)]
pub struct ShareResponse {
    /// Share ID
    pub id: String,
    /// Posting user ID
    pub user_id: String,
    /// Book title
    pub title: String,
    /// Book author
    pub author: String,
    /// Cover image URL, if any
    pub cover_url: Option<String>,
    /// Review text
    pub review: String,
    /// Number of likes
    pub like_count: i64,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Whether the requesting user has liked this share
    pub user_has_liked: bool,
    /// Author profile, if one exists
    pub profile: Option<ProfileResponse>,
}

/// Response for listing shares
#[derive(Debug, Serialize, JsonSchema)]
pub struct ListSharesResponse {
    /// Shares in the requested order
    pub shares: Vec<ShareResponse>,
}

/// Response for deleting a share
#[derive(Debug, Serialize, JsonSchema)]
pub struct DeletedResponse {
    /// Always true on success
    pub deleted: bool,
}

fn to_response(
    share: BookShare,
    liked: &HashSet<String>,
    profiles: &HashMap<String, ProfileResponse>,
) -> ShareResponse {
    ShareResponse {
        user_has_liked: liked.contains(&share.id),
        profile: profiles.get(&share.user_id).cloned(),
        id: share.id,
        user_id: share.user_id,
        title: share.title,
        author: share.author,
        cover_url: share.cover_url,
        review: share.review,
        like_count: share.like_count,
        created_at: share.created_at,
    }
}

/// Collects the set of share IDs the user has liked; empty for anonymous
async fn liked_share_ids(
    book_likes: &dyn BookLikeStore,
    user: Option<&AuthenticatedUser>,
) -> Result<HashSet<String>, AppError> {
    let Some(user) = user else {
        return Ok(HashSet::new());
    };

    Ok(book_likes
        .list_by_user(&user.user_id)
        .await?
        .into_iter()
        .map(|like| like.book_share_id)
        .collect())
}

/// Fetches profiles for the given user IDs, deduplicated
async fn profiles_for(
    profiles: &dyn ProfileStore,
    user_ids: impl IntoIterator<Item = String>,
) -> Result<HashMap<String, ProfileResponse>, AppError> {
    let unique: HashSet<String> = user_ids.into_iter().collect();

    let mut map = HashMap::with_capacity(unique.len());
    for user_id in unique {
        if let Some(profile) = profiles.get(&user_id).await? {
            map.insert(user_id, profile.into());
        }
    }
    Ok(map)
}

/// Lists shares with optional search filter and sort order
///
/// # Errors
///
/// Returns 500 on storage failure
pub async fn list_shares(
    user: Option<AuthenticatedUser>,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
    Query(params): Query<ListSharesParams>,
) -> Result<Json<ListSharesResponse>, AppError> {
    let mut shares = book_shares.list_all().await?;

    if let Some(search) = params
        .search
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.is_empty())
    {
        shares.retain(|share| {
            share.title.to_lowercase().contains(&search)
                || share.author.to_lowercase().contains(&search)
                || share.review.to_lowercase().contains(&search)
        });
    }

    match params.sort.unwrap_or_default() {
        SortOption::Newest => shares.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Popular => shares.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then(b.created_at.cmp(&a.created_at))
        }),
    }

    let liked = liked_share_ids(book_likes.as_ref(), user.as_ref()).await?;
    let profile_map = profiles_for(
        profiles.as_ref(),
        shares.iter().map(|share| share.user_id.clone()),
    )
    .await?;

    let shares = shares
        .into_iter()
        .map(|share| to_response(share, &liked, &profile_map))
        .collect();

    Ok(Json(ListSharesResponse { shares }))
}

/// Gets a single share by ID
///
/// # Errors
///
/// Returns 404 if the share does not exist, 500 on storage failure
pub async fn get_share(
    user: Option<AuthenticatedUser>,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
    Path(id): Path<String>,
) -> Result<Json<ShareResponse>, AppError> {
    let share = book_shares.get_by_id(&id).await?.ok_or_else(share_not_found)?;

    let user_has_liked = match user.as_ref() {
        Some(user) => book_likes.get_one(&id, &user.user_id).await?.is_some(),
        None => false,
    };

    let profile = profiles.get(&share.user_id).await?.map(Into::into);

    Ok(Json(ShareResponse {
        user_has_liked,
        profile,
        id: share.id,
        user_id: share.user_id,
        title: share.title,
        author: share.author,
        cover_url: share.cover_url,
        review: share.review,
        like_count: share.like_count,
        created_at: share.created_at,
    }))
}

/// Creates a new share owned by the caller
///
/// # Errors
///
/// Returns 401 without a session, 500 on storage failure
pub async fn create_share(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
    Valid(Json(payload)): Valid<Json<CreateShareRequest>>,
) -> Result<Json<ShareResponse>, AppError> {
    let share = BookShare {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        title: payload.title,
        author: payload.author,
        cover_url: payload.cover_url,
        review: payload.review,
        like_count: 0,
        created_at: Utc::now().timestamp_millis(),
    };
    book_shares.insert(&share).await?;

    let profile = profiles.get(&share.user_id).await?.map(Into::into);

    Ok(Json(ShareResponse {
        user_has_liked: false,
        profile,
        id: share.id,
        user_id: share.user_id,
        title: share.title,
        author: share.author,
        cover_url: share.cover_url,
        review: share.review,
        like_count: share.like_count,
        created_at: share.created_at,
    }))
}

/// Updates a share's content; owner only
///
/// # Errors
///
/// Returns 401 without a session, 403 for non-owners, 404 if the share does
/// not exist, 500 on storage failure
pub async fn update_share(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpdateShareRequest>>,
) -> Result<Json<ShareResponse>, AppError> {
    let share = book_shares.get_by_id(&id).await?.ok_or_else(share_not_found)?;

    if share.user_id != user.user_id {
        return Err(not_owner());
    }

    let update = BookShareUpdate {
        title: payload.title,
        author: payload.author,
        cover_url: payload.cover_url,
        review: payload.review,
    };
    book_shares.update_content(&id, &update).await?;

    let user_has_liked = book_likes.get_one(&id, &user.user_id).await?.is_some();
    let profile = profiles.get(&share.user_id).await?.map(Into::into);

    Ok(Json(ShareResponse {
        user_has_liked,
        profile,
        id: share.id,
        user_id: share.user_id,
        title: update.title,
        author: update.author,
        cover_url: update.cover_url,
        review: update.review,
        like_count: share.like_count,
        created_at: share.created_at,
    }))
}

/// Lists the caller's own shares, newest first
///
/// # Errors
///
/// Returns 401 without a session, 500 on storage failure
pub async fn list_my_shares(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
) -> Result<Json<ListSharesResponse>, AppError> {
    let mut shares = book_shares.list_by_user(&user.user_id).await?;
    shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let liked = liked_share_ids(book_likes.as_ref(), Some(&user)).await?;
    let profile_map = profiles_for(profiles.as_ref(), [user.user_id]).await?;

    let shares = shares
        .into_iter()
        .map(|share| to_response(share, &liked, &profile_map))
        .collect();

    Ok(Json(ListSharesResponse { shares }))
}

/// Lists the shares the caller has liked, most recently liked first
///
/// # Errors
///
/// Returns 401 without a session, 500 on storage failure
pub async fn list_liked_shares(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
) -> Result<Json<ListSharesResponse>, AppError> {
    let mut likes = book_likes.list_by_user(&user.user_id).await?;
    likes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut shares = Vec::with_capacity(likes.len());
    for like in likes {
        // A like row can briefly outlive its share during deletion; skip it
        if let Some(share) = book_shares.get_by_id(&like.book_share_id).await? {
            shares.push(share);
        }
    }

    let liked: HashSet<String> = shares.iter().map(|share| share.id.clone()).collect();
    let profile_map = profiles_for(
        profiles.as_ref(),
        shares.iter().map(|share| share.user_id.clone()),
    )
    .await?;

    let shares = shares
        .into_iter()
        .map(|share| to_response(share, &liked, &profile_map))
        .collect();

    Ok(Json(ListSharesResponse { shares }))
}

/// Deletes a share along with its likes and comments; owner only
///
/// # Errors
///
/// Returns 401 without a session, 403 for non-owners, 404 if the share does
/// not exist, 500 on storage failure
pub async fn delete_share(
    user: AuthenticatedUser,
    Extension(book_shares): Extension<Arc<dyn BookShareStore>>,
    Extension(book_likes): Extension<Arc<dyn BookLikeStore>>,
    Extension(comments): Extension<Arc<dyn CommentStore>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let share = book_shares.get_by_id(&id).await?.ok_or_else(share_not_found)?;

    if share.user_id != user.user_id {
        return Err(not_owner());
    }

    // Referential cleanup so orphaned rows do not accumulate
    for like in book_likes.list_by_share(&id).await? {
        book_likes.delete(&like.book_share_id, &like.user_id).await?;
    }
    for comment in comments.list_by_share(&id).await? {
        comments.delete(&comment.book_share_id, &comment.id).await?;
    }

    book_shares.delete(&id).await?;

    Ok(Json(DeletedResponse { deleted: true }))
}

pub(super) fn share_not_found() -> AppError {
    AppError::new(
        StatusCode::NOT_FOUND,
        "share_not_found",
        "Book share does not exist",
        false,
    )
}

fn not_owner() -> AppError {
    AppError::new(
        StatusCode::FORBIDDEN,
        "not_owner",
        "Only the share owner may modify it",
        false,
    )
}

//! Profile endpoints

use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use axum_valid::Valid;
use backend_storage::profile::{Profile, ProfileStore};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AuthenticatedUser, types::AppError};

/// Public profile fields, embedded in share and comment responses
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ProfileResponse {
    /// User ID
    pub id: String,
    /// Display name
    pub username: String,
    /// Avatar image URL, if one was uploaded
    pub avatar_url: Option<String>,
    /// Short biography
    pub bio: Option<String>,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
            created_at: profile.created_at,
        }
    }
}

/// Request body for creating or replacing the caller's profile
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PutProfileRequest {
    /// Display name
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    /// Short biography
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    /// Avatar image URL, typically from `POST /v1/media/avatars`
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Gets the caller's profile
///
/// # Errors
///
/// Returns 404 if no profile exists yet, 500 on storage failure
pub async fn get_profile(
    user: AuthenticatedUser,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = profiles.get(&user.user_id).await?.ok_or_else(|| {
        AppError::new(
            StatusCode::NOT_FOUND,
            "profile_not_found",
            "No profile exists for this user",
            false,
        )
    })?;

    Ok(Json(profile.into()))
}

/// Creates or replaces the caller's profile
///
/// The creation timestamp of an existing profile is preserved.
///
/// # Errors
///
/// Returns 500 on storage failure
pub async fn put_profile(
    user: AuthenticatedUser,
    Extension(profiles): Extension<Arc<dyn ProfileStore>>,
    Valid(Json(payload)): Valid<Json<PutProfileRequest>>,
) -> Result<Json<ProfileResponse>, AppError> {
    let created_at = profiles
        .get(&user.user_id)
        .await?
        .map_or_else(|| Utc::now().timestamp_millis(), |p| p.created_at);

    let profile = Profile {
        id: user.user_id,
        username: payload.username,
        avatar_url: payload.avatar_url,
        bio: payload.bio,
        created_at,
    };
    profiles.put(&profile).await?;

    Ok(Json(profile.into()))
}

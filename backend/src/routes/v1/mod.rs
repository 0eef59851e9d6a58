//! v1 API routes

pub mod comments;
pub mod likes;
pub mod media;
pub mod profile;
pub mod shares;

use aide::axum::{
    routing::{delete, get, post},
    ApiRouter,
};
use axum::extract::DefaultBodyLimit;
use axum::middleware;

use crate::middleware::auth::{auth_middleware, optional_auth_middleware};

/// Body limit for multipart uploads; above the 5 MiB file cap so oversize
/// files reach the handler and get an explicit 413 instead of a generic
/// rejection
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    // Share browsing is public but personalizes (user_has_liked) when a
    // session is present; writes on the same paths require a session, which
    // the handlers enforce through the `AuthenticatedUser` extractor.
    let share_routes = ApiRouter::new()
        .api_route(
            "/shares",
            get(shares::list_shares).post(shares::create_share),
        )
        .api_route(
            "/shares/{id}",
            get(shares::get_share)
                .put(shares::update_share)
                .delete(shares::delete_share),
        )
        .api_route(
            "/shares/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .layer(middleware::from_fn(optional_auth_middleware));

    let protected_routes = ApiRouter::new()
        .api_route(
            "/shares/{id}/likes",
            post(likes::like_share).delete(likes::unlike_share),
        )
        .api_route(
            "/shares/{id}/comments/{comment_id}",
            delete(comments::delete_comment),
        )
        .api_route(
            "/profile",
            get(profile::get_profile).put(profile::put_profile),
        )
        .api_route("/profile/shares", get(shares::list_my_shares))
        .api_route("/profile/likes", get(shares::list_liked_shares))
        // Multipart uploads are registered as plain routes; the multipart
        // extractor carries no OpenAPI schema
        .route(
            "/media/covers",
            axum::routing::post(media::upload_cover)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/media/avatars",
            axum::routing::post(media::upload_avatar)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .layer(middleware::from_fn(auth_middleware));

    share_routes.merge(protected_routes)
}

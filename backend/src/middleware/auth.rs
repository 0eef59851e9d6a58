//! Session authentication middleware

use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{
    session::SessionVerifier,
    types::{AppError, Environment},
};

/// Authenticated user information extracted from the session token
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedUser {
    /// User ID from the session subject
    pub user_id: String,
}

/// Axum extractor for authenticated user
///
/// Use this in handlers behind `auth_middleware` to get the verified user:
/// ```ignore
/// async fn protected_handler(
///     user: AuthenticatedUser,
///     // ... other extractors
/// ) -> Result<impl IntoResponse, AppError> {
///     // Access user.user_id
///     Ok("Protected content")
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authentication required but user not found in request extensions",
                false,
            )
        })
    }
}

/// Optional variant for public routes that personalize when a session exists
impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned())
    }
}

/// Session authentication middleware
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Verifies it with `SessionVerifier`
/// 3. Adds `AuthenticatedUser` to request extensions
/// 4. Returns 401 for invalid/missing tokens
///
/// In development, `disable_auth` skips verification and uses the raw token
/// as the user ID.
///
/// # Errors
///
/// - `AppError` - Invalid/missing token with 401 status code
pub async fn auth_middleware(
    Extension(verifier): Extension<Arc<SessionVerifier>>,
    Extension(environment): Extension<Environment>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let stripped_auth_header = bearer_token(&request);

    // If auth is disabled, we skip token verification
    // and use the token as the user id
    if environment.disable_auth() {
        if let Some(token) = stripped_auth_header {
            let authenticated_user = AuthenticatedUser {
                user_id: token.to_string(),
            };
            request.extensions_mut().insert(authenticated_user);
        }

        return Ok(next.run(request).await);
    }

    let token = stripped_auth_header.ok_or_else(|| {
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "Authorization header must contain a valid Bearer token",
            false,
        )
    })?;

    let claims = verifier.verify(token).map_err(|_| {
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired session token",
            false,
        )
    })?;

    let user = AuthenticatedUser {
        user_id: claims.sub,
    };
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Optional session middleware for public routes
///
/// Verifies a session token when one is present and injects
/// `AuthenticatedUser`, but never rejects the request. Anonymous requests
/// pass through untouched.
pub async fn optional_auth_middleware(
    Extension(verifier): Extension<Arc<SessionVerifier>>,
    Extension(environment): Extension<Environment>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request).map(ToString::to_string) {
        if environment.disable_auth() {
            let user = AuthenticatedUser { user_id: token };
            request.extensions_mut().insert(user);
        } else if let Ok(claims) = verifier.verify(&token) {
            let user = AuthenticatedUser {
                user_id: claims.sub,
            };
            request.extensions_mut().insert(user);
        }
    }

    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

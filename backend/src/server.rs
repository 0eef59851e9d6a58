//! Server setup and lifecycle

use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::Extension;
use backend_storage::{
    book_like::BookLikeStore, book_share::BookShareStore, comment::CommentStore,
    profile::ProfileStore,
};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;

use crate::routes;
use crate::{media_storage::MediaStorage, session::SessionVerifier, types::Environment};

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
#[allow(clippy::too_many_arguments)]
pub async fn start(
    environment: Environment,
    media_storage: Arc<MediaStorage>,
    session_verifier: Arc<SessionVerifier>,
    book_share_storage: Arc<dyn BookShareStore>,
    book_like_storage: Arc<dyn BookLikeStore>,
    comment_storage: Arc<dyn CommentStore>,
    profile_storage: Arc<dyn ProfileStore>,
) -> anyhow::Result<()> {
    let mut openapi = OpenApi::default();

    let router = routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(media_storage))
        .layer(Extension(session_verifier))
        .layer(Extension(book_share_storage))
        .layer(Extension(book_like_storage))
        .layer(Extension(comment_storage))
        .layer(Extension(profile_storage))
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        // Outlasts the 5s AWS operation timeout so storage slowness surfaces
        // as a degraded upload, not a dropped request
        .layer(tower_http::timeout::TimeoutLayer::new(
            std::time::Duration::from_secs(15),
        ));

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("📚 Bookshare Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

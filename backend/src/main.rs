//! Bookshare Backend binary

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;

use backend::{
    media_storage::{MediaStorage, S3ObjectStorage},
    server,
    session::SessionVerifier,
    types::Environment,
};
use backend_storage::{
    book_like::{BookLikeStorage, BookLikeStore},
    book_share::{BookShareStorage, BookShareStore},
    comment::{CommentStorage, CommentStore},
    profile::{ProfileStorage, ProfileStore},
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Configure logging format based on environment
    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let media_storage = if environment.media_offline() {
        Arc::new(MediaStorage::disconnected(
            environment.covers_bucket(),
            environment.avatars_bucket(),
        ))
    } else {
        let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
        let store = Arc::new(S3ObjectStorage::new(
            s3_client,
            environment.aws_region(),
            environment
                .override_aws_endpoint_url()
                .map(ToString::to_string),
        ));
        Arc::new(MediaStorage::new(
            store,
            environment.covers_bucket(),
            environment.avatars_bucket(),
        ))
    };

    let session_verifier = Arc::new(SessionVerifier::new(&environment.session_secret()));

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let book_share_storage: Arc<dyn BookShareStore> = Arc::new(BookShareStorage::new(
        dynamodb_client.clone(),
        environment.book_shares_table(),
        environment.user_index_name(),
    ));
    let book_like_storage: Arc<dyn BookLikeStore> = Arc::new(BookLikeStorage::new(
        dynamodb_client.clone(),
        environment.book_likes_table(),
        environment.user_index_name(),
    ));
    let comment_storage: Arc<dyn CommentStore> = Arc::new(CommentStorage::new(
        dynamodb_client.clone(),
        environment.comments_table(),
    ));
    let profile_storage: Arc<dyn ProfileStore> = Arc::new(ProfileStorage::new(
        dynamodb_client,
        environment.profiles_table(),
    ));

    server::start(
        environment,
        media_storage,
        session_verifier,
        book_share_storage,
        book_like_storage,
        comment_storage,
        profile_storage,
    )
    .await
}

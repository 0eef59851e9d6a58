//! Object storage and the resilient media upload path
//!
//! `MediaStorage::upload` never fails: every storage error collapses into a
//! placeholder image URL so the authoring flow stays responsive. The outcome
//! is tagged so callers can still surface degradation to the user.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{error::SdkError, primitives::ByteStream, Client as S3Client};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

pub use error::{StorageError, StorageResult};

/// Cache-control header applied to every stored object
const CACHE_CONTROL: &str = "max-age=3600";

/// Length of the random token in generated object keys
const PATH_TOKEN_LEN: usize = 16;

/// Fixed placeholder image dimensions
const PLACEHOLDER_WIDTH: u32 = 300;
/// Fixed placeholder image dimensions
const PLACEHOLDER_HEIGHT: u32 = 400;

/// Folder prefix for user uploads within each bucket
const UPLOADS_FOLDER: &str = "uploads";

/// A user-supplied file queued for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name, used to preserve the extension
    pub file_name: String,
    /// Declared MIME type, validated at the HTTP layer
    pub content_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

/// Result of an upload attempt; always carries a dereferenceable image URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file was persisted and this is its public URL
    Stored(String),
    /// Some step failed and this is a generated placeholder URL
    Placeholder(String),
}

impl UploadOutcome {
    /// Returns the image URL regardless of outcome
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Stored(url) | Self::Placeholder(url) => url,
        }
    }

    /// Whether the outcome is a placeholder rather than the stored object
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// Bucket-scoped object storage operations
///
/// Seam over the storage backend so tests can substitute an in-memory
/// implementation.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Lists the names of all existing buckets
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Transport` if the backend cannot be reached
    async fn list_buckets(&self) -> StorageResult<Vec<String>>;

    /// Writes an object, overwriting any existing object at the same key
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BucketNotFound`, `StorageError::PermissionDenied`
    /// or `StorageError::Transport` depending on the backend response
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> StorageResult<()>;

    /// Resolves the public URL for an object, if the backend exposes one
    fn public_url(&self, bucket: &str, key: &str) -> Option<String>;
}

/// S3-backed implementation of [`ObjectStorage`]
pub struct S3ObjectStorage {
    s3_client: Arc<S3Client>,
    region: String,
    endpoint_url: Option<String>,
}

impl S3ObjectStorage {
    /// Creates a new S3 object storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `region` - AWS region, used to build public object URLs
    /// * `endpoint_url` - Path-style endpoint override (`LocalStack`), if any
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        Self {
            s3_client,
            region,
            endpoint_url,
        }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let response = self
            .s3_client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        Ok(response
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(ToString::to_string))
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> StorageResult<()> {
        let result = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(service_err)) => {
                match service_err.raw().status().as_u16() {
                    403 => Err(StorageError::PermissionDenied(format!(
                        "{:?}",
                        service_err.err()
                    ))),
                    404 => Err(StorageError::BucketNotFound(bucket.to_string())),
                    _ => Err(StorageError::Transport(format!("{:?}", service_err.err()))),
                }
            }
            Err(e) => Err(StorageError::Transport(e.to_string())),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> Option<String> {
        // Path-style URL against the endpoint override, virtual-hosted
        // style against real S3
        self.endpoint_url.as_ref().map_or_else(
            || {
                Some(format!(
                    "https://{bucket}.s3.{region}.amazonaws.com/{key}",
                    region = self.region
                ))
            },
            |endpoint| Some(format!("{endpoint}/{bucket}/{key}")),
        )
    }
}

/// Media storage service for cover and avatar uploads
pub struct MediaStorage {
    store: Option<Arc<dyn ObjectStorage>>,
    covers_bucket: String,
    avatars_bucket: String,
}

impl MediaStorage {
    /// Creates a new media storage service backed by the given store
    #[must_use]
    pub const fn new(
        store: Arc<dyn ObjectStorage>,
        covers_bucket: String,
        avatars_bucket: String,
    ) -> Self {
        Self {
            store: Some(store),
            covers_bucket,
            avatars_bucket,
        }
    }

    /// Creates a media storage service with no backing store
    ///
    /// Every upload degrades to a placeholder. Used for offline development.
    #[must_use]
    pub const fn disconnected(covers_bucket: String, avatars_bucket: String) -> Self {
        Self {
            store: None,
            covers_bucket,
            avatars_bucket,
        }
    }

    /// Uploads a book cover image
    pub async fn upload_book_cover(&self, file: &UploadFile) -> UploadOutcome {
        self.upload(&self.covers_bucket, UPLOADS_FOLDER, file).await
    }

    /// Uploads an avatar image
    pub async fn upload_avatar(&self, file: &UploadFile) -> UploadOutcome {
        self.upload(&self.avatars_bucket, UPLOADS_FOLDER, file).await
    }

    /// Uploads a file to the given bucket and folder
    ///
    /// Never fails: a single linear attempt-then-fallback sequence where every
    /// failure mode collapses into a placeholder URL. Failure detail goes to
    /// the log stream only. No retries, no implicit bucket creation.
    pub async fn upload(&self, bucket: &str, folder: &str, file: &UploadFile) -> UploadOutcome {
        // Malformed input: skip networking entirely
        if file.bytes.is_empty() || file.file_name.is_empty() {
            tracing::warn!(
                bucket,
                file_name = %file.file_name,
                "Upload skipped: {}",
                StorageError::InvalidInput("empty file or file name".to_string())
            );
            return UploadOutcome::Placeholder(placeholder_url());
        }

        let Some(store) = self.store.as_ref() else {
            tracing::warn!(
                bucket,
                "Upload degraded: {}",
                StorageError::ClientNotInitialized
            );
            return UploadOutcome::Placeholder(placeholder_url());
        };

        // The target bucket must already exist; never create one implicitly
        let buckets = match store.list_buckets().await {
            Ok(buckets) => buckets,
            Err(e) => {
                tracing::warn!(bucket, "Bucket listing failed, degrading: {e}");
                return UploadOutcome::Placeholder(placeholder_url());
            }
        };

        if !buckets.iter().any(|name| name == bucket) {
            tracing::warn!(
                "Upload degraded: {}",
                StorageError::BucketNotFound(bucket.to_string())
            );
            return UploadOutcome::Placeholder(placeholder_url());
        }

        let key = generate_object_key(folder, &file.file_name);

        if let Err(e) = store
            .put_object(
                bucket,
                &key,
                file.bytes.clone(),
                &file.content_type,
                CACHE_CONTROL,
            )
            .await
        {
            tracing::warn!(bucket, key, "Upload failed, degrading: {e}");
            return UploadOutcome::Placeholder(placeholder_url());
        }

        match store.public_url(bucket, &key) {
            Some(url) => {
                tracing::info!(bucket, key, "Upload stored");
                UploadOutcome::Stored(url)
            }
            None => {
                tracing::warn!(
                    bucket,
                    key,
                    "Upload degraded: {}",
                    StorageError::UrlResolution("backend returned no public URL".to_string())
                );
                UploadOutcome::Placeholder(placeholder_url())
            }
        }
    }
}

/// Builds a unique object key: `{folder}/{unix_millis}-{token}.{ext}`
///
/// The timestamp plus random token make collisions overwhelmingly unlikely
/// across concurrent uploads. The extension is preserved from the original
/// file name.
fn generate_object_key(folder: &str, file_name: &str) -> String {
    let extension = file_name.rsplit('.').next().unwrap_or_default();

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PATH_TOKEN_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    format!(
        "{folder}/{timestamp}-{token}.{extension}",
        timestamp = Utc::now().timestamp_millis()
    )
}

/// Builds a placeholder image URL with fixed 300x400 dimensions
///
/// The randomized query parameter defeats caching. The placeholder provider
/// is independent from the storage backend, so a storage outage does not take
/// the fallback down with it.
fn placeholder_url() -> String {
    let seed = rand::thread_rng().gen_range(0..1000);
    format!("https://picsum.photos/{PLACEHOLDER_WIDTH}/{PLACEHOLDER_HEIGHT}?random={seed}")
}

mod common;

use std::sync::Arc;

use backend::media_storage::{MediaStorage, UploadFile, UploadOutcome};
use common::{media_storage, InMemoryObjectStorage, PutBehavior, COVERS_BUCKET};

fn jpeg_file(name: &str, size: usize) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0_u8; size],
    }
}

fn assert_placeholder(outcome: &UploadOutcome) {
    assert!(outcome.is_degraded(), "expected a placeholder outcome");
    let seed = outcome
        .url()
        .strip_prefix("https://picsum.photos/300/400?random=")
        .expect("placeholder URL has fixed 300x400 dimensions");
    let seed: u32 = seed.parse().expect("placeholder seed is numeric");
    assert!(seed < 1000);
}

/// Asserts the stored key matches `{folder}/{timestamp}-{token}.{ext}`
fn assert_key_shape(key: &str, folder: &str, extension: &str) {
    let rest = key
        .strip_prefix(&format!("{folder}/"))
        .expect("key starts with the folder");
    let stem = rest
        .strip_suffix(&format!(".{extension}"))
        .expect("key preserves the file extension");

    let (timestamp, token) = stem.split_once('-').expect("stem is timestamp-token");
    assert!(timestamp.parse::<i64>().is_ok(), "timestamp is numeric");
    assert_eq!(token.len(), 16);
    assert!(token
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
}

#[tokio::test]
async fn test_empty_file_returns_placeholder_without_network() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&[COVERS_BUCKET]));
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 0))
        .await;

    assert_placeholder(&outcome);
    assert_eq!(store.list_call_count(), 0);
    assert_eq!(store.put_call_count(), 0);
}

#[tokio::test]
async fn test_empty_file_name_returns_placeholder_without_network() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&[COVERS_BUCKET]));
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("", 100))
        .await;

    assert_placeholder(&outcome);
    assert_eq!(store.list_call_count(), 0);
    assert_eq!(store.put_call_count(), 0);
}

#[tokio::test]
async fn test_disconnected_storage_returns_placeholder() {
    let storage = MediaStorage::disconnected(
        COVERS_BUCKET.to_string(),
        "avatars".to_string(),
    );

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 100))
        .await;

    assert_placeholder(&outcome);
}

#[tokio::test]
async fn test_bucket_listing_failure_returns_placeholder() {
    let store = Arc::new(InMemoryObjectStorage::failing_list());
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 100))
        .await;

    assert_placeholder(&outcome);
    assert_eq!(store.put_call_count(), 0);
}

#[tokio::test]
async fn test_absent_bucket_returns_placeholder_without_upload() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&["some-other-bucket"]));
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 1000))
        .await;

    assert_placeholder(&outcome);
    assert_eq!(store.list_call_count(), 1);
    assert_eq!(store.put_call_count(), 0);
}

#[tokio::test]
async fn test_permission_denied_returns_placeholder_not_error() {
    let store = Arc::new(InMemoryObjectStorage::with_put_behavior(
        PutBehavior::PermissionDenied,
    ));
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 100))
        .await;

    assert_placeholder(&outcome);
    // No retry
    assert_eq!(store.put_call_count(), 1);
}

#[tokio::test]
async fn test_put_bucket_not_found_returns_placeholder_not_error() {
    let store = Arc::new(InMemoryObjectStorage::with_put_behavior(
        PutBehavior::BucketNotFound,
    ));
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 100))
        .await;

    assert_placeholder(&outcome);
    assert_eq!(store.put_call_count(), 1);
}

#[tokio::test]
async fn test_missing_public_url_returns_placeholder() {
    let store = Arc::new(InMemoryObjectStorage::without_public_url());
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 100))
        .await;

    assert_placeholder(&outcome);
    // The object was stored; only URL resolution degraded
    assert_eq!(store.put_call_count(), 1);
}

#[tokio::test]
async fn test_successful_upload_returns_resolved_url_and_key_shape() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&[COVERS_BUCKET]));
    let storage = media_storage(store.clone());

    let outcome = storage
        .upload(COVERS_BUCKET, "uploads", &jpeg_file("a.jpg", 1000))
        .await;

    assert!(!outcome.is_degraded());

    let stored = store.stored_keys();
    assert_eq!(stored.len(), 1);
    let (bucket, key) = &stored[0];
    assert_eq!(bucket, COVERS_BUCKET);
    assert_key_shape(key, "uploads", "jpg");

    // The returned URL is exactly the backend-resolved URL for that key
    assert_eq!(
        outcome.url(),
        format!("https://storage.test/{COVERS_BUCKET}/{key}")
    );
}

#[tokio::test]
async fn test_concurrent_same_name_uploads_get_distinct_keys() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&[COVERS_BUCKET]));
    let storage = Arc::new(media_storage(store.clone()));

    let file = jpeg_file("a.jpg", 100);
    let (a, b) = tokio::join!(
        storage.upload(COVERS_BUCKET, "uploads", &file),
        storage.upload(COVERS_BUCKET, "uploads", &file),
    );

    assert!(!a.is_degraded());
    assert!(!b.is_degraded());
    assert_ne!(a.url(), b.url());

    let stored = store.stored_keys();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].1, stored[1].1);
}

#[tokio::test]
async fn test_book_cover_convenience_uses_uploads_folder() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&[
        COVERS_BUCKET,
        "avatars",
    ]));
    let storage = media_storage(store.clone());

    let outcome = storage.upload_book_cover(&jpeg_file("cover.jpg", 100)).await;

    assert!(!outcome.is_degraded());
    let stored = store.stored_keys();
    assert_eq!(stored[0].0, COVERS_BUCKET);
    assert!(stored[0].1.starts_with("uploads/"));
}

#[tokio::test]
async fn test_avatar_convenience_targets_avatars_bucket() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&[
        COVERS_BUCKET,
        "avatars",
    ]));
    let storage = media_storage(store.clone());

    let outcome = storage.upload_avatar(&jpeg_file("me.png", 100)).await;

    assert!(!outcome.is_degraded());
    let stored = store.stored_keys();
    assert_eq!(stored[0].0, "avatars");
    assert_key_shape(&stored[0].1, "uploads", "png");
}

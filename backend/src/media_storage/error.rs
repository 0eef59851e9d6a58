//! Error types for object storage operations
//!
//! These never cross the upload boundary; the upload path absorbs every
//! variant into a placeholder outcome and logs the detail.

use thiserror::Error;

/// Result type for object storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during object storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// No storage client is attached (degraded/offline construction)
    #[error("Storage client is not initialized")]
    ClientNotInitialized,

    /// Target bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// The storage backend denied the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transport or service failure talking to the storage backend
    #[error("Storage transport error: {0}")]
    Transport(String),

    /// The backend could not resolve a public URL for the object
    #[error("URL resolution failed: {0}")]
    UrlResolution(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

//! Error types for book like storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, get_item::GetItemError, put_item::PutItemError,
    query::QueryError,
};
use thiserror::Error;

/// Result type alias for storage operations
pub type BookLikeStorageResult<T> = Result<T, BookLikeStorageError>;

/// Storage error types for book like operations
#[derive(Debug, Error)]
pub enum BookLikeStorageError {
    /// The user has already liked this share
    #[error("Like already exists for this share and user")]
    AlreadyLiked,

    /// Failed to insert like into `DynamoDB`
    #[error("Failed to insert book like into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get like from `DynamoDB`
    #[error("Failed to get book like from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to query likes from `DynamoDB`
    #[error("Failed to query book likes from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to delete like from `DynamoDB`
    #[error("Failed to delete book like from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Failed to parse like from `DynamoDB` item
    #[error("Failed to parse book like: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for BookLikeStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

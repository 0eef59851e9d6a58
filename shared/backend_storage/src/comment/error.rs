//! Error types for comment storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, get_item::GetItemError, put_item::PutItemError,
    query::QueryError,
};
use thiserror::Error;

/// Result type alias for storage operations
pub type CommentStorageResult<T> = Result<T, CommentStorageError>;

/// Storage error types for comment operations
#[derive(Debug, Error)]
pub enum CommentStorageError {
    /// Failed to insert comment into `DynamoDB`
    #[error("Failed to insert comment into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get comment from `DynamoDB`
    #[error("Failed to get comment from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to query comments from `DynamoDB`
    #[error("Failed to query comments from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to delete comment from `DynamoDB`
    #[error("Failed to delete comment from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Failed to parse comment from `DynamoDB` item
    #[error("Failed to parse comment: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for CommentStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

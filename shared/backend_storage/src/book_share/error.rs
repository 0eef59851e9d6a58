//! Error types for book share storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, get_item::GetItemError, put_item::PutItemError,
    query::QueryError, scan::ScanError, update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type alias for storage operations
pub type BookShareStorageResult<T> = Result<T, BookShareStorageError>;

/// Storage error types for book share operations
#[derive(Debug, Error)]
pub enum BookShareStorageError {
    /// Targeted share row does not exist
    #[error("Book share not found")]
    ShareNotFound,

    /// Failed to insert book share into `DynamoDB`
    #[error("Failed to insert book share into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get book share from `DynamoDB`
    #[error("Failed to get book share from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to update book share in `DynamoDB`
    #[error("Failed to update book share in DynamoDB: {0:?}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to query book shares from `DynamoDB`
    #[error("Failed to query book shares from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to scan book shares from `DynamoDB`
    #[error("Failed to scan book shares from DynamoDB: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// Failed to delete book share from `DynamoDB`
    #[error("Failed to delete book share from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Failed to parse book share from `DynamoDB` item
    #[error("Failed to parse book share: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for BookShareStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

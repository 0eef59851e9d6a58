//! Book like storage module for `DynamoDB` operations
//!
//! One row per (share, user) pair. The composite key makes "has this user
//! already liked this share" a single conditional write.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{BookLikeStorageError, BookLikeStorageResult};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, from_items, to_item};
use strum::Display;

/// `DynamoDB` row for a like on a book share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLike {
    /// Liked share ID (Primary Key)
    pub book_share_id: String,
    /// Liking user ID (Sort Key)
    pub user_id: String,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

/// `DynamoDB` attribute names for the book like table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BookLikeAttribute {
    /// Liked share ID (Primary Key)
    BookShareId,
    /// Liking user ID (Sort Key, also used for the GSI)
    UserId,
    /// Creation timestamp
    CreatedAt,
}

/// Book like storage operations
///
/// Seam over the `DynamoDB`-backed client so handlers can run against a
/// substitute backend in tests.
#[async_trait]
pub trait BookLikeStore: Send + Sync {
    /// Inserts a like, failing if this user already liked this share
    ///
    /// # Errors
    ///
    /// Returns `BookLikeStorageError::AlreadyLiked` if a row with the same
    /// `book_share_id` and `user_id` exists, or another `BookLikeStorageError`
    /// if the operation fails
    async fn insert(&self, like: &BookLike) -> BookLikeStorageResult<()>;

    /// Gets a single like by share and user
    ///
    /// # Errors
    ///
    /// Returns `BookLikeStorageError` if the get operation fails
    async fn get_one(
        &self,
        book_share_id: &str,
        user_id: &str,
    ) -> BookLikeStorageResult<Option<BookLike>>;

    /// Deletes a like
    ///
    /// # Errors
    ///
    /// Returns `BookLikeStorageError` if the delete operation fails
    async fn delete(&self, book_share_id: &str, user_id: &str) -> BookLikeStorageResult<()>;

    /// Gets all likes for a given share
    ///
    /// # Errors
    ///
    /// Returns `BookLikeStorageError` if the query operation fails
    async fn list_by_share(&self, book_share_id: &str) -> BookLikeStorageResult<Vec<BookLike>>;

    /// Gets all likes placed by a given user
    ///
    /// # Errors
    ///
    /// Returns `BookLikeStorageError` if the query operation fails
    async fn list_by_user(&self, user_id: &str) -> BookLikeStorageResult<Vec<BookLike>>;
}

/// `DynamoDB`-backed storage client for book like operations
pub struct BookLikeStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    user_index_name: String,
}

impl BookLikeStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for book likes
    /// * `user_index_name` - Name of the GSI for per-user queries
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        user_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            user_index_name,
        }
    }
}

#[async_trait]
impl BookLikeStore for BookLikeStorage {
    async fn insert(&self, like: &BookLike) -> BookLikeStorageResult<()> {
        let item = to_item(like)?;

        // Create only if *no item with this PK+SK* exists.
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk) AND attribute_not_exists(#sk)")
            .expression_attribute_names("#pk", BookLikeAttribute::BookShareId.to_string())
            .expression_attribute_names("#sk", BookLikeAttribute::UserId.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    BookLikeStorageError::AlreadyLiked
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    async fn get_one(
        &self,
        book_share_id: &str,
        user_id: &str,
    ) -> BookLikeStorageResult<Option<BookLike>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                BookLikeAttribute::BookShareId.to_string(),
                AttributeValue::S(book_share_id.to_string()),
            )
            .key(
                BookLikeAttribute::UserId.to_string(),
                AttributeValue::S(user_id.to_string()),
            )
            .send()
            .await?;

        response
            .item()
            .map(|item| from_item(item.clone()).map_err(Into::into))
            .transpose()
    }

    async fn delete(&self, book_share_id: &str, user_id: &str) -> BookLikeStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                BookLikeAttribute::BookShareId.to_string(),
                AttributeValue::S(book_share_id.to_string()),
            )
            .key(
                BookLikeAttribute::UserId.to_string(),
                AttributeValue::S(user_id.to_string()),
            )
            .send()
            .await?;

        Ok(())
    }

    async fn list_by_share(&self, book_share_id: &str) -> BookLikeStorageResult<Vec<BookLike>> {
        let response = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#pk = :book_share_id")
            .expression_attribute_names("#pk", BookLikeAttribute::BookShareId.to_string())
            .expression_attribute_values(
                ":book_share_id",
                AttributeValue::S(book_share_id.to_string()),
            )
            .send()
            .await?;

        from_items(response.items().to_vec()).map_err(Into::into)
    }

    async fn list_by_user(&self, user_id: &str) -> BookLikeStorageResult<Vec<BookLike>> {
        let response = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.user_index_name)
            .key_condition_expression("#user_id = :user_id")
            .expression_attribute_names("#user_id", BookLikeAttribute::UserId.to_string())
            .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await?;

        from_items(response.items().to_vec()).map_err(Into::into)
    }
}

//! Comment storage module for `DynamoDB` operations

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{CommentStorageError, CommentStorageResult};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, from_items, to_item};
use strum::Display;

/// `DynamoDB` row for a comment on a book share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Commented share ID (Primary Key)
    pub book_share_id: String,
    /// Unique comment ID (Sort Key, UUID v4)
    pub id: String,
    /// Authoring user ID
    pub user_id: String,
    /// Comment text
    pub content: String,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

/// `DynamoDB` attribute names for the comment table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommentAttribute {
    /// Commented share ID (Primary Key)
    BookShareId,
    /// Unique comment ID (Sort Key)
    Id,
    /// Authoring user ID
    UserId,
    /// Comment text
    Content,
    /// Creation timestamp
    CreatedAt,
}

/// Comment storage operations
///
/// Seam over the `DynamoDB`-backed client so handlers can run against a
/// substitute backend in tests.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Inserts a comment row
    ///
    /// # Errors
    ///
    /// Returns `CommentStorageError` if the put operation fails
    async fn insert(&self, comment: &Comment) -> CommentStorageResult<()>;

    /// Gets a single comment by share and comment ID
    ///
    /// # Errors
    ///
    /// Returns `CommentStorageError` if the get operation fails
    async fn get_one(&self, book_share_id: &str, id: &str)
        -> CommentStorageResult<Option<Comment>>;

    /// Gets all comments for a given share
    ///
    /// Rows come back in sort-key order; callers re-sort by `created_at`
    /// for display.
    ///
    /// # Errors
    ///
    /// Returns `CommentStorageError` if the query operation fails
    async fn list_by_share(&self, book_share_id: &str) -> CommentStorageResult<Vec<Comment>>;

    /// Deletes a comment
    ///
    /// # Errors
    ///
    /// Returns `CommentStorageError` if the delete operation fails
    async fn delete(&self, book_share_id: &str, id: &str) -> CommentStorageResult<()>;
}

/// `DynamoDB`-backed storage client for comment operations
pub struct CommentStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl CommentStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for comments
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }
}

#[async_trait]
impl CommentStore for CommentStorage {
    async fn insert(&self, comment: &Comment) -> CommentStorageResult<()> {
        let item = to_item(comment)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;

        Ok(())
    }

    async fn get_one(
        &self,
        book_share_id: &str,
        id: &str,
    ) -> CommentStorageResult<Option<Comment>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                CommentAttribute::BookShareId.to_string(),
                AttributeValue::S(book_share_id.to_string()),
            )
            .key(
                CommentAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        response
            .item()
            .map(|item| from_item(item.clone()).map_err(Into::into))
            .transpose()
    }

    async fn list_by_share(&self, book_share_id: &str) -> CommentStorageResult<Vec<Comment>> {
        let response = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#pk = :book_share_id")
            .expression_attribute_names("#pk", CommentAttribute::BookShareId.to_string())
            .expression_attribute_values(
                ":book_share_id",
                AttributeValue::S(book_share_id.to_string()),
            )
            .send()
            .await?;

        from_items(response.items().to_vec()).map_err(Into::into)
    }

    async fn delete(&self, book_share_id: &str, id: &str) -> CommentStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                CommentAttribute::BookShareId.to_string(),
                AttributeValue::S(book_share_id.to_string()),
            )
            .key(
                CommentAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        Ok(())
    }
}

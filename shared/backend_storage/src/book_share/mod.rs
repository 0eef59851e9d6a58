//! Book share storage module for `DynamoDB` operations
//!
//! A book share is the primary content entity of the application: a short
//! review of a book posted by a user, optionally carrying a cover image URL.

mod error;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{BookShareStorageError, BookShareStorageResult};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, from_items, to_item};
use strum::Display;

/// `DynamoDB` row for a book share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookShare {
    /// Primary key - unique share ID (UUID v4)
    pub id: String,
    /// ID of the user who posted the share
    pub user_id: String,
    /// Book title
    pub title: String,
    /// Book author
    pub author: String,
    /// Public URL of the cover image, if one was uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Review text
    pub review: String,
    /// Denormalized like counter, maintained via `add_to_like_count`
    pub like_count: i64,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

/// Content fields of a share that the owner may edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookShareUpdate {
    /// New book title
    pub title: String,
    /// New book author
    pub author: String,
    /// New cover image URL; `None` removes the cover
    pub cover_url: Option<String>,
    /// New review text
    pub review: String,
}

/// `DynamoDB` attribute names for the book share table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BookShareAttribute {
    /// Primary key - unique share ID
    Id,
    /// Posting user ID (used for the GSI)
    UserId,
    /// Book title
    Title,
    /// Book author
    Author,
    /// Cover image URL
    CoverUrl,
    /// Review text
    Review,
    /// Denormalized like counter
    LikeCount,
    /// Creation timestamp
    CreatedAt,
}

/// Book share storage operations
///
/// Seam over the `DynamoDB`-backed client so handlers can run against a
/// substitute backend in tests.
#[async_trait]
pub trait BookShareStore: Send + Sync {
    /// Inserts a book share row
    ///
    /// # Errors
    ///
    /// Returns `BookShareStorageError` if the put operation fails
    async fn insert(&self, share: &BookShare) -> BookShareStorageResult<()>;

    /// Gets a book share by ID
    ///
    /// # Errors
    ///
    /// Returns `BookShareStorageError` if the get operation fails
    async fn get_by_id(&self, id: &str) -> BookShareStorageResult<Option<BookShare>>;

    /// Updates the editable content fields of an existing share
    ///
    /// The `like_count` attribute is deliberately left untouched so concurrent
    /// like operations cannot be clobbered by a stale read.
    ///
    /// # Errors
    ///
    /// Returns `BookShareStorageError::ShareNotFound` if no row with this ID
    /// exists, or another `BookShareStorageError` if the update fails
    async fn update_content(
        &self,
        id: &str,
        update: &BookShareUpdate,
    ) -> BookShareStorageResult<()>;

    /// Atomically adds `delta` to the denormalized like counter and returns
    /// the counter's value after the update
    ///
    /// # Errors
    ///
    /// Returns `BookShareStorageError::ShareNotFound` if no row with this ID
    /// exists, or another `BookShareStorageError` if the update fails
    async fn add_to_like_count(&self, id: &str, delta: i64) -> BookShareStorageResult<i64>;

    /// Deletes a book share row
    ///
    /// # Errors
    ///
    /// Returns `BookShareStorageError` if the delete operation fails
    async fn delete(&self, id: &str) -> BookShareStorageResult<()>;

    /// Lists all book shares; ordering is left to the caller
    ///
    /// # Errors
    ///
    /// Returns `BookShareStorageError` if the scan operation fails
    async fn list_all(&self) -> BookShareStorageResult<Vec<BookShare>>;

    /// Lists all shares posted by a given user
    ///
    /// # Errors
    ///
    /// Returns `BookShareStorageError` if the query operation fails
    async fn list_by_user(&self, user_id: &str) -> BookShareStorageResult<Vec<BookShare>>;
}

/// `DynamoDB`-backed storage client for book share operations
pub struct BookShareStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    user_index_name: String,
}

impl BookShareStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for book shares
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
impl BookShareStore for BookShareStorage {
    async fn insert(&self, share: &BookShare) -> BookShareStorageResult<()> {
        let item = to_item(share)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> BookShareStorageResult<Option<BookShare>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                BookShareAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        response
            .item()
            .map(|item| from_item(item.clone()).map_err(Into::into))
            .transpose()
    }

    async fn update_content(
        &self,
        id: &str,
        update: &BookShareUpdate,
    ) -> BookShareStorageResult<()> {
        let mut expression =
            "SET #title = :title, #author = :author, #review = :review".to_string();
        let mut request = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(
                BookShareAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", BookShareAttribute::Id.to_string())
            .expression_attribute_names("#title", BookShareAttribute::Title.to_string())
            .expression_attribute_names("#author", BookShareAttribute::Author.to_string())
            .expression_attribute_names("#review", BookShareAttribute::Review.to_string())
            .expression_attribute_names("#cover_url", BookShareAttribute::CoverUrl.to_string())
            .expression_attribute_values(":title", AttributeValue::S(update.title.clone()))
            .expression_attribute_values(":author", AttributeValue::S(update.author.clone()))
            .expression_attribute_values(":review", AttributeValue::S(update.review.clone()));

        if let Some(cover_url) = &update.cover_url {
            expression.push_str(", #cover_url = :cover_url");
            request = request
                .expression_attribute_values(":cover_url", AttributeValue::S(cover_url.clone()));
        } else {
            expression.push_str(" REMOVE #cover_url");
        }

        request
            .update_expression(expression)
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    BookShareStorageError::ShareNotFound
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    async fn add_to_like_count(&self, id: &str, delta: i64) -> BookShareStorageResult<i64> {
        let response = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(
                BookShareAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .update_expression("ADD #like_count :delta")
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", BookShareAttribute::Id.to_string())
            .expression_attribute_names("#like_count", BookShareAttribute::LikeCount.to_string())
            .expression_attribute_values(":delta", AttributeValue::N(delta.to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    BookShareStorageError::ShareNotFound
                } else {
                    err.into()
                }
            })?;

        // The ADD result is the authoritative counter; callers echo it back
        // instead of a read-then-increment value that concurrent likes could
        // have outdated.
        response
            .attributes()
            .and_then(|attributes| attributes.get(&BookShareAttribute::LikeCount.to_string()))
            .and_then(|value| value.as_n().ok())
            .and_then(|count| count.parse::<i64>().ok())
            .ok_or_else(|| {
                BookShareStorageError::SerializationError(
                    "update response is missing the like_count attribute".to_string(),
                )
            })
    }

    async fn delete(&self, id: &str) -> BookShareStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                BookShareAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        Ok(())
    }

    /// This is a full table scan. The table holds short review rows at
    /// community scale, so a scan stays cheap.
    async fn list_all(&self) -> BookShareStorageResult<Vec<BookShare>> {
        let mut shares = Vec::new();
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let response = self
                .dynamodb_client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            for item in response.items() {
                shares.push(from_item(item.clone())?);
            }

            exclusive_start_key = response.last_evaluated_key().cloned();
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(shares)
    }

    async fn list_by_user(&self, user_id: &str) -> BookShareStorageResult<Vec<BookShare>> {
        let response = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.user_index_name)
            .key_condition_expression("#user_id = :user_id")
            .expression_attribute_names("#user_id", BookShareAttribute::UserId.to_string())
            .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await?;

        from_items(response.items().to_vec()).map_err(Into::into)
    }
}

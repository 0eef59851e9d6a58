//! Profile storage module for `DynamoDB` operations

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{ProfileStorageError, ProfileStorageResult};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, to_item};
use strum::Display;

/// `DynamoDB` row for a user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Primary key - user ID issued by the auth backend
    pub id: String,
    /// Display name
    pub username: String,
    /// Public URL of the avatar image, if one was uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Short biography
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

/// `DynamoDB` attribute names for the profile table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProfileAttribute {
    /// Primary key - user ID
    Id,
    /// Display name
    Username,
    /// Avatar image URL
    AvatarUrl,
    /// Short biography
    Bio,
    /// Creation timestamp
    CreatedAt,
}

/// Profile storage operations
///
/// Seam over the `DynamoDB`-backed client so handlers can run against a
/// substitute backend in tests.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Gets a profile by user ID
    ///
    /// # Errors
    ///
    /// Returns `ProfileStorageError` if the get operation fails
    async fn get(&self, id: &str) -> ProfileStorageResult<Option<Profile>>;

    /// Inserts or replaces a profile row
    ///
    /// # Errors
    ///
    /// Returns `ProfileStorageError` if the put operation fails
    async fn put(&self, profile: &Profile) -> ProfileStorageResult<()>;
}

/// `DynamoDB`-backed storage client for profile operations
pub struct ProfileStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl ProfileStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for profiles
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }
}

#[async_trait]
impl ProfileStore for ProfileStorage {
    async fn get(&self, id: &str) -> ProfileStorageResult<Option<Profile>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                ProfileAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        response
            .item()
            .map(|item| from_item(item.clone()).map_err(Into::into))
            .transpose()
    }

    async fn put(&self, profile: &Profile) -> ProfileStorageResult<()> {
        let item = to_item(profile)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;

        Ok(())
    }
}

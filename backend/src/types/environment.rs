//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Skip session verification and treat the bearer token as the user ID
        disable_auth: bool,
        /// Run without an S3 connection; uploads degrade to placeholders
        offline_media: bool,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development {
                disable_auth: flag_enabled("DISABLE_AUTH"),
                offline_media: flag_enabled("OFFLINE_MEDIA"),
            },
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name for book cover images
    ///
    /// # Panics
    ///
    /// Panics if the `COVERS_BUCKET_NAME` environment variable is not set
    /// outside development
    #[must_use]
    pub fn covers_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("COVERS_BUCKET_NAME")
                .expect("COVERS_BUCKET_NAME environment variable is not set"),
            Self::Development { .. } => {
                env::var("COVERS_BUCKET_NAME").unwrap_or_else(|_| "book-covers".to_string())
            }
        }
    }

    /// Returns the S3 bucket name for avatar images
    ///
    /// # Panics
    ///
    /// Panics if the `AVATARS_BUCKET_NAME` environment variable is not set
    /// outside development
    #[must_use]
    pub fn avatars_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("AVATARS_BUCKET_NAME")
                .expect("AVATARS_BUCKET_NAME environment variable is not set"),
            Self::Development { .. } => {
                env::var("AVATARS_BUCKET_NAME").unwrap_or_else(|_| "avatars".to_string())
            }
        }
    }

    /// Returns the `DynamoDB` table name for book shares
    #[must_use]
    pub fn book_shares_table(&self) -> String {
        self.table_name("BOOK_SHARES_TABLE_NAME", "book-shares")
    }

    /// Returns the `DynamoDB` table name for book likes
    #[must_use]
    pub fn book_likes_table(&self) -> String {
        self.table_name("BOOK_LIKES_TABLE_NAME", "book-likes")
    }

    /// Returns the `DynamoDB` table name for comments
    #[must_use]
    pub fn comments_table(&self) -> String {
        self.table_name("COMMENTS_TABLE_NAME", "comments")
    }

    /// Returns the `DynamoDB` table name for profiles
    #[must_use]
    pub fn profiles_table(&self) -> String {
        self.table_name("PROFILES_TABLE_NAME", "profiles")
    }

    /// Returns the GSI name for user-keyed lookups on shares and likes
    #[must_use]
    pub fn user_index_name(&self) -> String {
        env::var("USER_INDEX_NAME").unwrap_or_else(|_| "user_id-index".to_string())
    }

    /// Returns the HS256 secret used to verify session tokens
    ///
    /// # Panics
    ///
    /// Panics if the `SESSION_JWT_SECRET` environment variable is not set
    /// outside development
    #[must_use]
    pub fn session_secret(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("SESSION_JWT_SECRET")
                .expect("SESSION_JWT_SECRET environment variable is not set"),
            Self::Development { .. } => env::var("SESSION_JWT_SECRET")
                .unwrap_or_else(|_| "bookshare-dev-session-secret".to_string()),
        }
    }

    /// Returns the AWS region used to build public object URLs
    #[must_use]
    pub fn aws_region(&self) -> String {
        env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string())
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether session verification is disabled
    #[must_use]
    pub const fn disable_auth(&self) -> bool {
        matches!(
            self,
            Self::Development {
                disable_auth: true,
                ..
            }
        )
    }

    /// Whether the service runs without an object storage connection
    #[must_use]
    pub const fn media_offline(&self) -> bool {
        matches!(
            self,
            Self::Development {
                offline_media: true,
                ..
            }
        )
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    ///
    /// The operation timeout bounds every storage call so an unresponsive
    /// backend cannot suspend an upload indefinitely.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(5))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    fn table_name(&self, var: &str, dev_default: &str) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var(var).unwrap_or_else(|_| panic!("{var} environment variable is not set"))
            }
            Self::Development { .. } => {
                env::var(var).unwrap_or_else(|_| dev_default.to_string())
            }
        }
    }
}

fn flag_enabled(var: &str) -> bool {
    env::var(var).is_ok_and(|val| val.trim().eq_ignore_ascii_case("true"))
}

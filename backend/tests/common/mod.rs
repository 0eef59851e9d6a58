#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aide::openapi::OpenApi;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Extension, Router};
use backend::{
    media_storage::{MediaStorage, ObjectStorage, StorageError, StorageResult},
    routes,
    session::{SessionClaims, SessionVerifier},
    types::Environment,
};
use backend_storage::{
    book_like::{BookLike, BookLikeStorageError, BookLikeStorageResult, BookLikeStore},
    book_share::{
        BookShare, BookShareStorageError, BookShareStorageResult, BookShareStore, BookShareUpdate,
    },
    comment::{Comment, CommentStorageResult, CommentStore},
    profile::{Profile, ProfileStorageResult, ProfileStore},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;

/// Shared session secret for tests
pub const TEST_SECRET: &str = "bookshare-test-session-secret";

/// Bucket names used throughout the tests
pub const COVERS_BUCKET: &str = "book-covers";
pub const AVATARS_BUCKET: &str = "avatars";

/// How the fake storage responds to `put_object`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutBehavior {
    Succeed,
    PermissionDenied,
    BucketNotFound,
}

/// In-memory [`ObjectStorage`] substitute with call counters
pub struct InMemoryObjectStorage {
    pub buckets: Vec<String>,
    pub fail_list: bool,
    pub put_behavior: PutBehavior,
    pub no_public_url: bool,
    pub list_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    pub stored_keys: Mutex<Vec<(String, String)>>,
}

impl InMemoryObjectStorage {
    pub fn with_buckets(buckets: &[&str]) -> Self {
        Self {
            buckets: buckets.iter().map(ToString::to_string).collect(),
            fail_list: false,
            put_behavior: PutBehavior::Succeed,
            no_public_url: false,
            list_calls: AtomicUsize::new(0),
            put_calls: AtomicUsize::new(0),
            stored_keys: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_list() -> Self {
        Self {
            fail_list: true,
            ..Self::with_buckets(&[COVERS_BUCKET, AVATARS_BUCKET])
        }
    }

    pub fn with_put_behavior(behavior: PutBehavior) -> Self {
        Self {
            put_behavior: behavior,
            ..Self::with_buckets(&[COVERS_BUCKET, AVATARS_BUCKET])
        }
    }

    pub fn without_public_url() -> Self {
        Self {
            no_public_url: true,
            ..Self::with_buckets(&[COVERS_BUCKET, AVATARS_BUCKET])
        }
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn put_call_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn stored_keys(&self) -> Vec<(String, String)> {
        self.stored_keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(StorageError::Transport("listing unavailable".to_string()));
        }
        Ok(self.buckets.clone())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
        _cache_control: &str,
    ) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        match self.put_behavior {
            PutBehavior::Succeed => {
                self.stored_keys
                    .lock()
                    .unwrap()
                    .push((bucket.to_string(), key.to_string()));
                Ok(())
            }
            PutBehavior::PermissionDenied => {
                Err(StorageError::PermissionDenied("access denied".to_string()))
            }
            PutBehavior::BucketNotFound => Err(StorageError::BucketNotFound(bucket.to_string())),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> Option<String> {
        if self.no_public_url {
            return None;
        }
        Some(format!("https://storage.test/{bucket}/{key}"))
    }
}

/// Builds a [`MediaStorage`] over the given fake store
pub fn media_storage(store: Arc<InMemoryObjectStorage>) -> MediaStorage {
    MediaStorage::new(
        store,
        COVERS_BUCKET.to_string(),
        AVATARS_BUCKET.to_string(),
    )
}

/// In-memory [`BookShareStore`] substitute
#[derive(Default)]
pub struct InMemoryShareStore {
    rows: Mutex<HashMap<String, BookShare>>,
    /// Counter delta applied ahead of the caller's inside
    /// `add_to_like_count`, standing in for another writer whose
    /// increment lands between the handler's read and its ADD
    pub racing_like_delta: AtomicI64,
}

impl InMemoryShareStore {
    pub fn seed(&self, share: BookShare) {
        self.rows.lock().unwrap().insert(share.id.clone(), share);
    }

    pub fn row(&self, id: &str) -> Option<BookShare> {
        self.rows.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl BookShareStore for InMemoryShareStore {
    async fn insert(&self, share: &BookShare) -> BookShareStorageResult<()> {
        self.seed(share.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> BookShareStorageResult<Option<BookShare>> {
        Ok(self.row(id))
    }

    async fn update_content(
        &self,
        id: &str,
        update: &BookShareUpdate,
    ) -> BookShareStorageResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(id).ok_or(BookShareStorageError::ShareNotFound)?;
        row.title = update.title.clone();
        row.author = update.author.clone();
        row.cover_url = update.cover_url.clone();
        row.review = update.review.clone();
        Ok(())
    }

    async fn add_to_like_count(&self, id: &str, delta: i64) -> BookShareStorageResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(id).ok_or(BookShareStorageError::ShareNotFound)?;
        row.like_count += self.racing_like_delta.swap(0, Ordering::SeqCst);
        row.like_count += delta;
        Ok(row.like_count)
    }

    async fn delete(&self, id: &str) -> BookShareStorageResult<()> {
        self.rows.lock().unwrap().remove(id);
        Ok(())
    }

    async fn list_all(&self) -> BookShareStorageResult<Vec<BookShare>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn list_by_user(&self, user_id: &str) -> BookShareStorageResult<Vec<BookShare>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|share| share.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// In-memory [`BookLikeStore`] substitute
#[derive(Default)]
pub struct InMemoryLikeStore {
    rows: Mutex<Vec<BookLike>>,
}

impl InMemoryLikeStore {
    pub fn seed(&self, like: BookLike) {
        self.rows.lock().unwrap().push(like);
    }

    pub fn rows_for_share(&self, book_share_id: &str) -> Vec<BookLike> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|like| like.book_share_id == book_share_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookLikeStore for InMemoryLikeStore {
    async fn insert(&self, like: &BookLike) -> BookLikeStorageResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|row| row.book_share_id == like.book_share_id && row.user_id == like.user_id)
        {
            return Err(BookLikeStorageError::AlreadyLiked);
        }
        rows.push(like.clone());
        Ok(())
    }

    async fn get_one(
        &self,
        book_share_id: &str,
        user_id: &str,
    ) -> BookLikeStorageResult<Option<BookLike>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.book_share_id == book_share_id && row.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, book_share_id: &str, user_id: &str) -> BookLikeStorageResult<()> {
        self.rows
            .lock()
            .unwrap()
            .retain(|row| !(row.book_share_id == book_share_id && row.user_id == user_id));
        Ok(())
    }

    async fn list_by_share(&self, book_share_id: &str) -> BookLikeStorageResult<Vec<BookLike>> {
        Ok(self.rows_for_share(book_share_id))
    }

    async fn list_by_user(&self, user_id: &str) -> BookLikeStorageResult<Vec<BookLike>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// In-memory [`CommentStore`] substitute
#[derive(Default)]
pub struct InMemoryCommentStore {
    rows: Mutex<Vec<Comment>>,
}

impl InMemoryCommentStore {
    pub fn seed(&self, comment: Comment) {
        self.rows.lock().unwrap().push(comment);
    }

    pub fn rows_for_share(&self, book_share_id: &str) -> Vec<Comment> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|comment| comment.book_share_id == book_share_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn insert(&self, comment: &Comment) -> CommentStorageResult<()> {
        self.seed(comment.clone());
        Ok(())
    }

    async fn get_one(
        &self,
        book_share_id: &str,
        id: &str,
    ) -> CommentStorageResult<Option<Comment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.book_share_id == book_share_id && row.id == id)
            .cloned())
    }

    async fn list_by_share(&self, book_share_id: &str) -> CommentStorageResult<Vec<Comment>> {
        Ok(self.rows_for_share(book_share_id))
    }

    async fn delete(&self, book_share_id: &str, id: &str) -> CommentStorageResult<()> {
        self.rows
            .lock()
            .unwrap()
            .retain(|row| !(row.book_share_id == book_share_id && row.id == id));
        Ok(())
    }
}

/// In-memory [`ProfileStore`] substitute
#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: Mutex<HashMap<String, Profile>>,
}

impl InMemoryProfileStore {
    pub fn seed(&self, profile: Profile) {
        self.rows.lock().unwrap().insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, id: &str) -> ProfileStorageResult<Option<Profile>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn put(&self, profile: &Profile) -> ProfileStorageResult<()> {
        self.seed(profile.clone());
        Ok(())
    }
}

/// Builds a share row with the given owner; remaining fields are filler
pub fn share_row(id: &str, user_id: &str) -> BookShare {
    BookShare {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: "The Dispossessed".to_string(),
        author: "Ursula K. Le Guin".to_string(),
        cover_url: None,
        review: "An ambiguous utopia.".to_string(),
        like_count: 0,
        created_at: chrono::Utc::now().timestamp_millis(),
    }
}

/// Mints a valid session token for the given user
pub fn mint_session_token(user_id: &str) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token encoding succeeds")
}

/// Base test setup building the router with test dependencies
///
/// The in-memory row stores are kept alongside the router so tests can seed
/// rows and inspect state after a request.
pub struct TestSetup {
    pub router: Router,
    pub shares: Arc<InMemoryShareStore>,
    pub likes: Arc<InMemoryLikeStore>,
    pub comments: Arc<InMemoryCommentStore>,
    pub profiles: Arc<InMemoryProfileStore>,
}

impl TestSetup {
    pub fn new(media_storage: Arc<MediaStorage>) -> Self {
        Self::with_environment(
            media_storage,
            Environment::Development {
                disable_auth: false,
                offline_media: false,
            },
        )
    }

    pub fn with_environment(media_storage: Arc<MediaStorage>, environment: Environment) -> Self {
        // Initialize tracing for tests
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();

        let session_verifier = Arc::new(SessionVerifier::new(TEST_SECRET));

        let shares = Arc::new(InMemoryShareStore::default());
        let likes = Arc::new(InMemoryLikeStore::default());
        let comments = Arc::new(InMemoryCommentStore::default());
        let profiles = Arc::new(InMemoryProfileStore::default());

        let mut openapi = OpenApi::default();
        let router = routes::handler()
            .finish_api(&mut openapi)
            .layer(Extension(openapi))
            .layer(Extension(environment))
            .layer(Extension(media_storage))
            .layer(Extension(session_verifier))
            .layer(Extension(Arc::clone(&shares) as Arc<dyn BookShareStore>))
            .layer(Extension(Arc::clone(&likes) as Arc<dyn BookLikeStore>))
            .layer(Extension(Arc::clone(&comments) as Arc<dyn CommentStore>))
            .layer(Extension(Arc::clone(&profiles) as Arc<dyn ProfileStore>));

        Self {
            router,
            shares,
            likes,
            comments,
            profiles,
        }
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_json_request(
        &self,
        method: &str,
        route: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder().uri(route).method(method);

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json)?)
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body)?).await?;
        Ok(response)
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        token: Option<&str>,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let boundary = "bookshare-test-boundary";
        let body = multipart_body(boundary, "file", file_name, content_type, bytes);

        let mut builder = Request::builder().uri(route).method("POST").header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        );

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body))?)
            .await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }
}

/// Encodes a single-field multipart body
pub fn multipart_body(
    boundary: &str,
    field_name: &str,
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

mod common;

use std::sync::Arc;

use common::{media_storage, InMemoryObjectStorage, TestSetup, COVERS_BUCKET};
use http::StatusCode;

#[tokio::test]
async fn test_health_endpoint() {
    let store = Arc::new(InMemoryObjectStorage::with_buckets(&[COVERS_BUCKET]));
    let setup = TestSetup::new(Arc::new(media_storage(store)));

    let response = setup
        .send_get_request("/health")
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);

    let body = setup
        .parse_response_body(response)
        .await
        .expect("response parses");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["semver"], env!("CARGO_PKG_VERSION"));
}

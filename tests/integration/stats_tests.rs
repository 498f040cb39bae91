//! Integration tests for the usage statistics endpoint.
//!
//! The aggregator itself is covered by unit tests; these verify the HTTP
//! surface: folder enumeration, JSON shape and degradation behavior.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::test_utils::{get_request, response_json, test_router, MockContentStore};

#[tokio::test]
async fn test_stats_two_folder_scenario() {
    let meta_a = r#"{"x.png": {"tags": "red,blue", "uploadedAt": "2024-01-01T00:00:00Z"}}"#;
    let store = MockContentStore::new()
        .with_file("public/a/x.png", vec![0u8; 100])
        .with_file("public/a/metadata.json", meta_a.as_bytes().to_vec())
        .with_file("public/b/y.jpg", vec![0u8; 200]);

    let router = test_router(store);
    let response = router.oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;

    let summary = &body["summary"];
    assert_eq!(summary["totalImages"], 2);
    assert_eq!(summary["totalSize"], 300);
    assert_eq!(summary["totalSizeMB"], "0.00");
    assert_eq!(summary["totalTagged"], 1);
    assert_eq!(summary["percentTagged"], 50);
    assert_eq!(summary["folderCount"], 2);

    assert_eq!(body["folders"]["a"], json!({"count": 1, "size": 100}));
    assert_eq!(body["folders"]["b"], json!({"count": 1, "size": 200}));

    let uploads = body["recentUploads"].as_array().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["name"], "x.png");
    assert_eq!(uploads[0]["folder"], "a");
    assert_eq!(uploads[0]["url"], "https://images.test/a/x.png");
    assert_eq!(uploads[0]["uploadedAt"], "2024-01-01T00:00:00Z");

    assert_eq!(
        body["topTags"],
        json!([{"tag": "red", "count": 1}, {"tag": "blue", "count": 1}])
    );

    assert!(body["generatedAt"].is_string());
}

#[tokio::test]
async fn test_stats_skips_failing_folder() {
    let store = MockContentStore::new()
        .with_file("public/bad/x.png", vec![0u8; 10])
        .with_file("public/good/y.png", vec![0u8; 20])
        .with_failure("public/bad");

    let router = test_router(store);
    let response = router.oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert!(body["folders"].get("bad").is_none());
    assert_eq!(body["folders"]["good"], json!({"count": 1, "size": 20}));
    assert_eq!(body["summary"]["totalImages"], 1);
}

#[tokio::test]
async fn test_stats_metadata_fetch_failure_degrades_one_folder() {
    let meta_a = r#"{"x.png": {"tags": "red", "uploadedAt": "2024-01-01T00:00:00Z"}}"#;
    let meta_b = r#"{"y.png": {"tags": "blue", "uploadedAt": "2024-02-01T00:00:00Z"}}"#;
    let store = MockContentStore::new()
        .with_file("public/a/x.png", vec![0u8; 100])
        .with_file("public/a/metadata.json", meta_a.as_bytes().to_vec())
        .with_file("public/b/y.png", vec![0u8; 50])
        .with_file("public/b/metadata.json", meta_b.as_bytes().to_vec())
        .with_failure("public/b/metadata.json");

    let router = test_router(store);
    let response = router.oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;

    // b's images still count; only its tags and upload records are lost
    assert_eq!(body["summary"]["totalImages"], 2);
    assert_eq!(body["folders"]["a"], json!({"count": 1, "size": 100}));
    assert_eq!(body["folders"]["b"], json!({"count": 1, "size": 50}));

    assert_eq!(body["summary"]["totalTagged"], 1);
    assert_eq!(body["topTags"], json!([{"tag": "red", "count": 1}]));

    let uploads = body["recentUploads"].as_array().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["folder"], "a");
}

#[tokio::test]
async fn test_stats_unreadable_metadata_degrades_to_untagged() {
    let store = MockContentStore::new()
        .with_file("public/a/x.png", vec![0u8; 1])
        .with_file("public/a/metadata.json", b"{broken".to_vec());

    let router = test_router(store);
    let response = router.oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["summary"]["totalImages"], 1);
    assert_eq!(body["summary"]["totalTagged"], 0);
    assert_eq!(body["summary"]["percentTagged"], 0);
}

#[tokio::test]
async fn test_stats_failing_enumeration_is_an_error() {
    let store = MockContentStore::new()
        .with_file("public/a/x.png", vec![0u8; 1])
        .with_failure("public");

    let router = test_router(store);
    let response = router.oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

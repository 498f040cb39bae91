//! Integration tests for folder listing and creation.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::test_utils::{get_request, json_request, response_json, test_router, MockContentStore};

#[tokio::test]
async fn test_list_folders() {
    let store = MockContentStore::new()
        .with_file("public/logos/a.png", vec![0u8; 1])
        .with_file("public/photos/b.jpg", vec![0u8; 1])
        .with_file("public/index.html", b"<html>".to_vec());

    let router = test_router(store);
    let response = router.oneshot(get_request("/folders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["folders"], json!(["logos", "photos"]));
}

#[tokio::test]
async fn test_list_folders_empty_root_is_not_found() {
    let router = test_router(MockContentStore::new());
    let response = router.oneshot(get_request("/folders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_folder_sanitizes_name() {
    let store = MockContentStore::new();
    let router = test_router(store.clone());

    let response = router
        .oneshot(json_request("POST", "/folders", json!({"name": "My Photos"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["folder"], "my-photos");

    assert!(store.contains("public/my-photos/README.md").await);
}

#[tokio::test]
async fn test_create_folder_requires_name() {
    let router = test_router(MockContentStore::new());
    let response = router
        .oneshot(json_request("POST", "/folders", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "missing_field");
}

#[tokio::test]
async fn test_create_folder_store_failure_is_bad_gateway() {
    let store = MockContentStore::new().with_failure("public/broken");
    let router = test_router(store);

    let response = router
        .oneshot(json_request("POST", "/folders", json!({"name": "broken"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "connection_error");
}

//! API integration tests for the image endpoints.
//!
//! Tests verify:
//! - Image listing with metadata merging
//! - Upload, delete, metadata and download flows
//! - QR code generation
//! - HTTP response codes and headers

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use tower::ServiceExt;

use super::test_utils::{
    delete_request, get_request, json_request, response_bytes, response_json, test_router,
    MockContentStore,
};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let router = test_router(MockContentStore::new());

    let response = router.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Image Listing
// =============================================================================

#[tokio::test]
async fn test_images_listing_with_metadata() {
    let metadata = r#"{"a.png": {"tags": "red", "description": "a red square", "uploadedAt": "2024-05-01T12:00:00Z"}}"#;
    let store = MockContentStore::new()
        .with_file("public/logos/a.png", vec![0u8; 64])
        .with_file("public/logos/metadata.json", metadata.as_bytes().to_vec())
        .with_file("public/logos/notes.txt", b"not an image".to_vec());

    let router = test_router(store);
    let response = router
        .oneshot(get_request("/images?folder=logos"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["totalImages"], 1);
    assert_eq!(body["folders"], json!(["logos"]));

    let image = &body["images"][0];
    assert_eq!(image["name"], "a.png");
    assert_eq!(image["folder"], "logos");
    assert_eq!(image["url"], "https://images.test/logos/a.png");
    assert_eq!(image["size"], 64);
    assert_eq!(image["tags"], "red");
    assert_eq!(image["description"], "a red square");
    assert_eq!(image["uploadedAt"], "2024-05-01T12:00:00Z");
}

#[tokio::test]
async fn test_images_listing_defaults_to_configured_folders() {
    // Only "logos" of the two default folders exists; the other is skipped
    let store = MockContentStore::new().with_file("public/logos/a.png", vec![0u8; 1]);

    let router = test_router(store);
    let response = router.oneshot(get_request("/images")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["totalImages"], 1);
    assert_eq!(body["folders"], json!(["references", "logos"]));
}

#[tokio::test]
async fn test_images_listing_missing_folder_is_empty_not_error() {
    let router = test_router(MockContentStore::new());
    let response = router
        .oneshot(get_request("/images?folder=ghost"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["totalImages"], 0);
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_success() {
    let store = MockContentStore::new();
    let router = test_router(store.clone());

    let body = json!({
        "filename": "new.png",
        "content": BASE64.encode(b"png-bytes"),
        "folder": "logos",
        "tags": "brand",
    });
    let response = router
        .oneshot(json_request("POST", "/upload", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["url"], "https://images.test/logos/new.png");
    assert!(body["commit"].is_string());

    // Blob and metadata entry both landed in the store
    assert_eq!(
        store.read("public/logos/new.png").await.unwrap(),
        b"png-bytes"
    );
    let sidecar = store.read("public/logos/metadata.json").await.unwrap();
    let sidecar: serde_json::Value = serde_json::from_slice(&sidecar).unwrap();
    assert_eq!(sidecar["new.png"]["tags"], "brand");
    assert!(sidecar["new.png"]["uploadedAt"].is_string());
}

#[tokio::test]
async fn test_upload_missing_fields() {
    for body in [
        json!({"content": "aGk=", "folder": "logos"}),
        json!({"filename": "a.png", "folder": "logos"}),
        json!({"filename": "a.png", "content": "aGk="}),
    ] {
        let router = test_router(MockContentStore::new());
        let response = router
            .oneshot(json_request("POST", "/upload", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["error"], "missing_field");
    }
}

#[tokio::test]
async fn test_upload_rejects_bad_base64() {
    let router = test_router(MockContentStore::new());

    let body = json!({
        "filename": "a.png",
        "content": "not base64 !!!",
        "folder": "logos",
    });
    let response = router
        .oneshot(json_request("POST", "/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn test_upload_store_failure_is_bad_gateway() {
    let store = MockContentStore::new().with_failure("public/logos");
    let router = test_router(store);

    let body = json!({
        "filename": "a.png",
        "content": BASE64.encode(b"x"),
        "folder": "logos",
    });
    let response = router
        .oneshot(json_request("POST", "/upload", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_success_scrubs_metadata() {
    let metadata = r#"{"a.png": {"tags": "x"}, "keep.png": {"tags": "y"}}"#;
    let store = MockContentStore::new()
        .with_file("public/logos/a.png", vec![1, 2, 3])
        .with_file("public/logos/metadata.json", metadata.as_bytes().to_vec());

    let router = test_router(store.clone());
    let response = router
        .oneshot(delete_request("/images/logos/a.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"], "a.png");

    assert!(!store.contains("public/logos/a.png").await);
    let sidecar = store.read("public/logos/metadata.json").await.unwrap();
    let sidecar: serde_json::Value = serde_json::from_slice(&sidecar).unwrap();
    assert!(sidecar.get("a.png").is_none());
    assert!(sidecar.get("keep.png").is_some());
}

#[tokio::test]
async fn test_delete_missing_file_is_not_found() {
    let router = test_router(MockContentStore::new());
    let response = router
        .oneshot(delete_request("/images/logos/ghost.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["status"], 404);
}

// =============================================================================
// Metadata
// =============================================================================

#[tokio::test]
async fn test_metadata_update_creates_sidecar() {
    let store = MockContentStore::new().with_file("public/logos/a.png", vec![0u8; 1]);
    let router = test_router(store.clone());

    let body = json!({
        "folder": "logos",
        "filename": "a.png",
        "tags": "brand,dark",
        "description": "dark variant",
    });
    let response = router
        .oneshot(json_request("POST", "/metadata", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "a.png");
    assert_eq!(body["tags"], "brand,dark");

    let sidecar = store.read("public/logos/metadata.json").await.unwrap();
    let sidecar: serde_json::Value = serde_json::from_slice(&sidecar).unwrap();
    assert_eq!(sidecar["a.png"]["tags"], "brand,dark");
    assert!(sidecar["a.png"]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_metadata_update_preserves_uploaded_at() {
    let metadata = r#"{"a.png": {"tags": "old", "uploadedAt": "2024-01-01T00:00:00Z"}}"#;
    let store = MockContentStore::new()
        .with_file("public/logos/metadata.json", metadata.as_bytes().to_vec());

    let router = test_router(store.clone());
    let body = json!({"folder": "logos", "filename": "a.png", "tags": "new"});
    let response = router
        .oneshot(json_request("POST", "/metadata", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sidecar = store.read("public/logos/metadata.json").await.unwrap();
    let sidecar: serde_json::Value = serde_json::from_slice(&sidecar).unwrap();
    assert_eq!(sidecar["a.png"]["tags"], "new");
    assert_eq!(sidecar["a.png"]["uploadedAt"], "2024-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_metadata_missing_fields() {
    let router = test_router(MockContentStore::new());

    let response = router
        .oneshot(json_request("POST", "/metadata", json!({"folder": "logos"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "missing_field");
}

// =============================================================================
// Download
// =============================================================================

#[tokio::test]
async fn test_download_manifest() {
    let store = MockContentStore::new()
        .with_file("public/docs/scan.pdf", vec![0u8; 50])
        .with_file("public/docs/cover.png", vec![0u8; 30])
        .with_file("public/docs/ignore.dat", vec![0u8; 99]);

    let router = test_router(store);
    let response = router
        .oneshot(get_request("/download?folder=docs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["folder"], "docs");
    assert_eq!(body["count"], 2);

    let files = body["files"].as_array().unwrap();
    assert!(files.iter().all(|f| f["downloadUrl"].is_string()));
    assert!(files
        .iter()
        .any(|f| f["viewUrl"] == "https://images.test/docs/scan.pdf"));
}

#[tokio::test]
async fn test_download_requires_folder() {
    let router = test_router(MockContentStore::new());
    let response = router.oneshot(get_request("/download")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "missing_field");
}

#[tokio::test]
async fn test_download_missing_folder_is_not_found() {
    let router = test_router(MockContentStore::new());
    let response = router
        .oneshot(get_request("/download?folder=ghost"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_folder_without_media_is_not_found() {
    let store = MockContentStore::new().with_file("public/docs/metadata.json", b"{}".to_vec());

    let router = test_router(store);
    let response = router
        .oneshot(get_request("/download?folder=docs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// QR Codes
// =============================================================================

#[tokio::test]
async fn test_qr_returns_png_with_cache_headers() {
    let router = test_router(MockContentStore::new());
    let response = router
        .oneshot(get_request(
            "/qr?url=https%3A%2F%2Fimages.test%2Flogos%2Fa.png",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=86400"
    );

    let bytes = response_bytes(response).await;
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn test_qr_requires_url() {
    let router = test_router(MockContentStore::new());
    let response = router.oneshot(get_request("/qr")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "missing_field");
}

//! HTTP request handlers for the imgbridge API.
//!
//! Every handler is a stateless translator: validate the request, call one
//! library operation, reshape the result into JSON.
//!
//! # Endpoints
//!
//! - `GET    /health` - Health check
//! - `GET    /folders` - List folders
//! - `POST   /folders` - Create a folder
//! - `GET    /images` - List images with metadata
//! - `POST   /upload` - Upload an image (base64 body)
//! - `DELETE /images/{folder}/{filename}` - Delete an image
//! - `POST   /metadata` - Tag or describe an image
//! - `GET    /download` - Download manifest for a folder
//! - `GET    /stats` - Usage statistics
//! - `GET    /qr` - QR code PNG for a URL

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{LibraryError, QrError, StoreError};
use crate::library::{DownloadLink, ImageLibrary, ImageRecord, UsageReport};
use crate::qr::{qr_png, DEFAULT_QR_SIZE};
use crate::store::ContentStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to all handlers via Axum's State extractor.
pub struct AppState<S: ContentStore> {
    /// The image library service
    pub library: Arc<ImageLibrary<S>>,

    /// Cache-Control max-age in seconds for QR responses
    pub cache_max_age: u32,
}

impl<S: ContentStore> AppState<S> {
    /// Create a new application state with the given library.
    pub fn new(library: ImageLibrary<S>) -> Self {
        Self {
            library: Arc::new(library),
            cache_max_age: 86400, // 24 hours default
        }
    }

    /// Create a new application state with custom cache max-age.
    pub fn with_cache_max_age(library: ImageLibrary<S>, cache_max_age: u32) -> Self {
        Self {
            library: Arc::new(library),
            cache_max_age,
        }
    }
}

impl<S: ContentStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            library: Arc::clone(&self.library),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Body of a folder creation request.
#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    /// Desired folder name (sanitized server-side)
    #[serde(default)]
    pub name: String,
}

/// Body of an upload request.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// File name within the folder
    #[serde(default)]
    pub filename: String,

    /// Base64-encoded file content
    #[serde(default)]
    pub content: String,

    /// Target folder
    #[serde(default)]
    pub folder: String,

    /// Optional comma-separated tags
    #[serde(default)]
    pub tags: Option<String>,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of a metadata update request.
#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    /// Folder the file lives in
    #[serde(default)]
    pub folder: String,

    /// File name within the folder
    #[serde(default)]
    pub filename: String,

    /// Comma-separated tags (null clears them)
    #[serde(default)]
    pub tags: Option<String>,

    /// Description (null clears it)
    #[serde(default)]
    pub description: Option<String>,
}

/// Query parameters for the images listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ImagesQueryParams {
    /// Restrict the listing to one folder; defaults to the configured set
    #[serde(default)]
    pub folder: Option<String>,
}

/// Query parameters for the download manifest endpoint.
#[derive(Debug, Deserialize)]
pub struct DownloadQueryParams {
    #[serde(default)]
    pub folder: Option<String>,
}

/// Query parameters for the QR endpoint.
#[derive(Debug, Deserialize)]
pub struct QrQueryParams {
    /// Payload to encode (required)
    #[serde(default)]
    pub url: Option<String>,

    /// Edge length in pixels (default: 200, clamped 64-1024, grown
    /// when the payload needs more modules than that)
    #[serde(default = "default_qr_size")]
    pub size: u32,
}

fn default_qr_size() -> u32 {
    DEFAULT_QR_SIZE
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "missing_field")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Response from the folders listing endpoint.
#[derive(Debug, Serialize)]
pub struct FoldersResponse {
    /// Folder names under the content root
    pub folders: Vec<String>,
}

/// Response from the folder creation endpoint.
#[derive(Debug, Serialize)]
pub struct CreateFolderResponse {
    pub success: bool,

    /// The sanitized folder name as created
    pub folder: String,
}

/// Response from the images listing endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesResponse {
    /// Number of images returned
    pub total_images: usize,

    /// Folders that were queried
    pub folders: Vec<String>,

    /// The images, with metadata merged in
    pub images: Vec<ImageRecord>,
}

/// Response from the upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,

    /// Public view URL of the uploaded image
    pub url: String,

    /// Link to the recording commit, if the store provided one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Response from the delete endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,

    /// Name of the deleted file
    pub deleted: String,
}

/// Response from the metadata update endpoint.
#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub success: bool,
    pub filename: String,
    pub tags: Option<String>,
    pub description: Option<String>,
}

/// Response from the download manifest endpoint.
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    /// The folder the manifest covers
    pub folder: String,

    /// Number of files in the manifest
    pub count: usize,

    /// Download links
    pub files: Vec<DownloadLink>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Wrapper for library errors to implement IntoResponse.
///
/// 4xx responses are logged at WARN or DEBUG level (client errors),
/// 5xx responses at ERROR level (server errors).
pub struct ApiError(pub LibraryError);

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        ApiError(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(LibraryError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self.0 {
            LibraryError::Store(StoreError::NotFound(path)) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Not found: {}", path),
            ),

            // The store's own verdict is propagated as-is
            LibraryError::Store(StoreError::Api { status, message }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "store_error",
                message.clone(),
            ),

            LibraryError::Store(StoreError::Connection(msg)) => (
                StatusCode::BAD_GATEWAY,
                "connection_error",
                format!("Connection error: {}", msg),
            ),

            LibraryError::Store(StoreError::Decode(msg)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "decode_error",
                format!("Decode error: {}", msg),
            ),

            LibraryError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                "missing_field",
                format!("Missing required field: {}", field),
            ),

            LibraryError::InvalidPayload(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_payload",
                format!("Invalid payload: {}", msg),
            ),

            LibraryError::EmptyFolder(folder) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("No files found in folder: {}", folder),
            ),
        };

        log_error_response(status, error_type, &message);

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Wrapper for QR generation errors to implement IntoResponse.
pub struct QrHandlerError(pub QrError);

impl IntoResponse for QrHandlerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self.0 {
            QrError::Encode(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_payload",
                format!("Payload cannot be encoded: {}", msg),
            ),
            QrError::Render(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "render_error",
                format!("Failed to render QR code: {}", msg),
            ),
        };

        log_error_response(status, error_type, &message);

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Log an error response at a level matching its severity.
fn log_error_response(status: StatusCode, error_type: &str, message: &str) {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else if status == StatusCode::NOT_FOUND {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Resource not found: {}",
            message
        );
    } else {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle folder listing requests.
///
/// # Endpoint
///
/// `GET /folders`
///
/// # Response
///
/// `200 OK` with `{"folders": ["references", "logos"]}`.
pub async fn list_folders_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<FoldersResponse>, ApiError> {
    let folders = state.library.list_folders().await?;
    Ok(Json(FoldersResponse { folders }))
}

/// Handle folder creation requests.
///
/// # Endpoint
///
/// `POST /folders` with body `{"name": "My Photos"}`
///
/// The name is sanitized server-side; the response carries the name as
/// created.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or empty name
pub async fn create_folder_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<Json<CreateFolderResponse>, ApiError> {
    let folder = state.library.create_folder(&request.name).await?;
    Ok(Json(CreateFolderResponse {
        success: true,
        folder,
    }))
}

/// Handle image listing requests.
///
/// # Endpoint
///
/// `GET /images?folder=references`
///
/// Without a `folder` parameter, the configured default folders are
/// queried. Folders that cannot be listed are silently skipped.
pub async fn images_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ImagesQueryParams>,
) -> Json<ImagesResponse> {
    let images = state.library.list_images(query.folder.as_deref()).await;

    let folders = match query.folder {
        Some(folder) => vec![folder],
        None => state.library.default_folders().to_vec(),
    };

    Json(ImagesResponse {
        total_images: images.len(),
        folders,
        images,
    })
}

/// Handle image upload requests.
///
/// # Endpoint
///
/// `POST /upload` with body:
/// ```json
/// {
///   "filename": "logo.png",
///   "content": "<base64>",
///   "folder": "logos",
///   "tags": "brand,header",
///   "description": "Primary logo"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing filename/content/folder, or content is not
///   valid base64
/// - `413 Payload Too Large`: Body exceeds the 10 MB limit
pub async fn upload_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    if request.filename.is_empty() {
        return Err(LibraryError::MissingField("filename").into());
    }
    if request.content.is_empty() {
        return Err(LibraryError::MissingField("content").into());
    }
    if request.folder.is_empty() {
        return Err(LibraryError::MissingField("folder").into());
    }

    let content = BASE64
        .decode(request.content.as_bytes())
        .map_err(|e| LibraryError::InvalidPayload(format!("content is not valid base64: {}", e)))?;

    let outcome = state
        .library
        .upload(
            &request.folder,
            &request.filename,
            &content,
            request.tags.as_deref(),
            request.description.as_deref(),
        )
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        url: outcome.url,
        commit: outcome.commit_url,
    }))
}

/// Handle image deletion requests.
///
/// # Endpoint
///
/// `DELETE /images/{folder}/{filename}`
///
/// # Errors
///
/// - `404 Not Found`: The file does not exist
pub async fn delete_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
    Path((folder, filename)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.library.delete(&folder, &filename).await?;
    Ok(Json(DeleteResponse {
        success: true,
        deleted: filename,
    }))
}

/// Handle metadata update requests.
///
/// # Endpoint
///
/// `POST /metadata` with body
/// `{"folder": "logos", "filename": "logo.png", "tags": "brand", "description": "..."}`
///
/// Omitting `tags` or `description` clears them; an existing upload
/// timestamp is preserved.
///
/// # Errors
///
/// - `400 Bad Request`: Missing folder or filename
pub async fn metadata_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<MetadataRequest>,
) -> Result<Json<MetadataResponse>, ApiError> {
    if request.folder.is_empty() {
        return Err(LibraryError::MissingField("folder").into());
    }
    if request.filename.is_empty() {
        return Err(LibraryError::MissingField("filename").into());
    }

    let entry = state
        .library
        .update_metadata(
            &request.folder,
            &request.filename,
            request.tags.as_deref(),
            request.description.as_deref(),
        )
        .await?;

    Ok(Json(MetadataResponse {
        success: true,
        filename: request.filename,
        tags: entry.tags,
        description: entry.description,
    }))
}

/// Handle download manifest requests.
///
/// # Endpoint
///
/// `GET /download?folder=references`
///
/// # Errors
///
/// - `400 Bad Request`: Missing folder parameter
/// - `404 Not Found`: Folder missing or holds no media files
pub async fn download_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<DownloadQueryParams>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let folder = query
        .folder
        .filter(|f| !f.is_empty())
        .ok_or(LibraryError::MissingField("folder"))?;

    let files = state.library.download_manifest(&folder).await?;

    Ok(Json(DownloadResponse {
        count: files.len(),
        folder,
        files,
    }))
}

/// Handle usage statistics requests.
///
/// # Endpoint
///
/// `GET /stats`
///
/// Enumerates folders from the store, then aggregates best-effort: folders
/// or sidecars that fail to load contribute nothing rather than failing
/// the report.
///
/// # Errors
///
/// - `500/502`: Only when the folder enumeration itself fails
pub async fn stats_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<UsageReport>, ApiError> {
    let folders = state.library.list_folders().await?;
    let report = state.library.usage_report(&folders).await;
    Ok(Json(report))
}

/// Handle QR code requests.
///
/// # Endpoint
///
/// `GET /qr?url=https://...&size=200`
///
/// # Response
///
/// `200 OK` with PNG body, `Content-Type: image/png` and
/// `Cache-Control: public, max-age={cache_max_age}`.
///
/// # Errors
///
/// - `400 Bad Request`: Missing url parameter, or payload too long
pub async fn qr_handler<S: ContentStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<QrQueryParams>,
) -> Result<Response, Response> {
    let Some(url) = query.url.filter(|u| !u.is_empty()) else {
        let status = StatusCode::BAD_REQUEST;
        let body = ErrorResponse::with_status("missing_field", "URL parameter required", status);
        return Err((status, Json(body)).into_response());
    };

    let png = qr_png(&url, query.size).map_err(|e| QrHandlerError(e).into_response())?;

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        ),
    ];

    Ok((StatusCode::OK, headers, png).into_response())
}

// =============================================================================
// Tests
// =============================================================================

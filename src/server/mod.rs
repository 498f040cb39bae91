//! HTTP server layer for imgbridge.
//!
//! This module provides the JSON API that fronts the image library.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     /folders /images /upload /metadata /download /stats /qr     │
//! │                                                                 │
//! │        ┌──────────────────┐      ┌──────────────────┐           │
//! │        │     handlers     │      │      routes      │           │
//! │        │ (validate/shape) │      │ (router + CORS)  │           │
//! │        └──────────────────┘      └──────────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    create_folder_handler, delete_handler, download_handler, health_handler, images_handler,
    list_folders_handler, metadata_handler, qr_handler, stats_handler, upload_handler, ApiError,
    AppState, CreateFolderRequest, CreateFolderResponse, DeleteResponse, DownloadResponse,
    ErrorResponse, FoldersResponse, HealthResponse, ImagesResponse, MetadataRequest,
    MetadataResponse, UploadRequest, UploadResponse,
};
pub use routes::{create_router, RouterConfig, MAX_BODY_BYTES};

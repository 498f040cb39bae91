//! Router configuration for imgbridge.
//!
//! This module defines the HTTP routes and applies the CORS and tracing
//! middleware.
//!
//! # Route Structure
//!
//! ```text
//! /health                        - Health check
//! /folders                       - List (GET) / create (POST) folders
//! /images                        - List images (GET)
//! /images/{folder}/{filename}    - Delete an image (DELETE)
//! /upload                        - Upload an image (POST)
//! /metadata                      - Update metadata (POST)
//! /download                      - Download manifest (GET)
//! /stats                         - Usage statistics (GET)
//! /qr                            - QR code PNG (GET)
//! ```

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{delete, get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::library::ImageLibrary;
use crate::store::ContentStore;

use super::handlers::{
    create_folder_handler, delete_handler, download_handler, health_handler, images_handler,
    list_folders_handler, metadata_handler, qr_handler, stats_handler, upload_handler, AppState,
};

/// Maximum accepted request body size (uploads are base64-encoded images).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds for QR responses
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cors_origins: None, // Allow any origin by default
            cache_max_age: 86400,
            enable_tracing: true,
        }
    }
}

impl RouterConfig {
    /// Create a configuration with the defaults: any CORS origin, 24 hour
    /// QR cache max-age, tracing enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `library` - The image library backing all endpoints
/// * `config` - Router configuration
///
/// # Returns
///
/// A configured Axum router ready to be served.
pub fn create_router<S>(library: ImageLibrary<S>, config: RouterConfig) -> Router
where
    S: ContentStore + 'static,
{
    let app_state = AppState::with_cache_max_age(library, config.cache_max_age);

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/folders",
            get(list_folders_handler::<S>).post(create_folder_handler::<S>),
        )
        .route("/images", get(images_handler::<S>))
        .route("/images/{folder}/{filename}", delete(delete_handler::<S>))
        .route("/upload", post(upload_handler::<S>))
        .route("/metadata", post(metadata_handler::<S>))
        .route("/download", get(download_handler::<S>))
        .route("/stats", get(stats_handler::<S>))
        .route("/qr", get(qr_handler::<S>))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

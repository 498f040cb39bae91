//! Configuration management for imgbridge.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `IMG_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the `IMG_` prefix:
//!
//! - `IMG_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMG_PORT` - Server port (default: 3000)
//! - `IMG_GITHUB_TOKEN` - Access token for the content store (required)
//! - `IMG_GITHUB_OWNER` - Repository owner (required)
//! - `IMG_GITHUB_REPO` - Repository name (required)
//! - `IMG_API_BASE` - Contents API base URL (default: https://api.github.com)
//! - `IMG_PUBLIC_BASE_URL` - Public base URL images are served from (required)
//! - `IMG_CONTENT_ROOT` - Path prefix inside the repository (default: public)
//! - `IMG_DEFAULT_FOLDERS` - Folders listed when no folder is given
//! - `IMG_CORS_ORIGINS` - Allowed CORS origins (default: any)
//! - `IMG_CACHE_MAX_AGE` - Cache-Control max-age for QR responses (default: 86400)

use clap::Parser;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default contents API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default path prefix inside the repository under which folders live.
pub const DEFAULT_CONTENT_ROOT: &str = "public";

/// Default HTTP cache max-age for generated QR codes (24 hours).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 86400;

/// Folders queried by default when a request does not name one.
pub const DEFAULT_FOLDERS: &str = "references,logos,textures,photos,assets";

// =============================================================================
// CLI Arguments
// =============================================================================

/// imgbridge - An image hosting gateway backed by a Git content store.
///
/// Proxies uploads, listings, deletions, metadata tagging, usage statistics
/// and QR generation onto a repository contents API. The gateway itself is
/// stateless; the repository is the single source of truth.
#[derive(Parser, Debug, Clone)]
#[command(name = "imgbridge")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMG_PORT")]
    pub port: u16,

    // =========================================================================
    // Content Store Configuration
    // =========================================================================
    /// Access token for the content store API.
    #[arg(long, env = "IMG_GITHUB_TOKEN")]
    pub github_token: String,

    /// Owner of the repository that stores the images.
    #[arg(long, env = "IMG_GITHUB_OWNER")]
    pub github_owner: String,

    /// Name of the repository that stores the images.
    #[arg(long, env = "IMG_GITHUB_REPO")]
    pub github_repo: String,

    /// Base URL of the contents API.
    ///
    /// Override for GitHub Enterprise or a local test double.
    #[arg(long, default_value = DEFAULT_API_BASE, env = "IMG_API_BASE")]
    pub api_base: String,

    /// Public base URL that serves the stored images (e.g. a CDN domain).
    ///
    /// Used to build view URLs returned in listings and upload responses.
    #[arg(long, env = "IMG_PUBLIC_BASE_URL")]
    pub public_base_url: String,

    /// Path prefix inside the repository under which folders live.
    #[arg(long, default_value = DEFAULT_CONTENT_ROOT, env = "IMG_CONTENT_ROOT")]
    pub content_root: String,

    /// Folders queried when a listing request does not name one (comma-separated).
    #[arg(long, default_value = DEFAULT_FOLDERS, env = "IMG_DEFAULT_FOLDERS", value_delimiter = ',')]
    pub default_folders: Vec<String>,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// HTTP Cache-Control max-age in seconds for QR code responses.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "IMG_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.github_token.is_empty() {
            return Err(
                "Content store token is required. Set --github-token or IMG_GITHUB_TOKEN"
                    .to_string(),
            );
        }

        if self.github_owner.is_empty() {
            return Err(
                "Repository owner is required. Set --github-owner or IMG_GITHUB_OWNER".to_string(),
            );
        }

        if self.github_repo.is_empty() {
            return Err(
                "Repository name is required. Set --github-repo or IMG_GITHUB_REPO".to_string(),
            );
        }

        if self.public_base_url.is_empty() {
            return Err(
                "Public base URL is required. Set --public-base-url or IMG_PUBLIC_BASE_URL"
                    .to_string(),
            );
        }

        if self.content_root.is_empty() {
            return Err("content_root must not be empty".to_string());
        }

        if let Err(e) = url::Url::parse(&self.api_base) {
            return Err(format!("api_base is not a valid URL: {}", e));
        }

        if let Err(e) = url::Url::parse(&self.public_base_url) {
            return Err(format!("public_base_url is not a valid URL: {}", e));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================

//! # imgbridge
//!
//! A stateless HTTP gateway that hosts images on a Git-backed content store.
//!
//! Every endpoint is a request/response translator: it validates its input,
//! issues one or more calls to the remote repository contents API, reshapes
//! the result into JSON and returns. The repository is the single source of
//! truth; the gateway keeps no state of its own.
//!
//! ## Features
//!
//! - **Uploads**: Base64 image uploads committed straight to the repository
//! - **Folders**: Caller-defined namespaces, one metadata sidecar each
//! - **Metadata**: Free-text tags and descriptions per image
//! - **Statistics**: Best-effort usage aggregation (totals, per-folder
//!   subtotals, recent uploads, top tags)
//! - **Downloads**: Per-folder manifests of direct download links
//! - **QR codes**: Locally generated PNG QR codes for share URLs
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`store`] - Content store trait and the GitHub contents API client
//! - [`library`] - Domain layer: folders, uploads, metadata, statistics
//! - [`server`] - Axum-based HTTP server and routes
//! - [`qr`] - QR code rendering
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use imgbridge::{create_router, GithubStore, ImageLibrary, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = GithubStore::new(
//!         "https://api.github.com",
//!         "acme",
//!         "images",
//!         "<token>",
//!     );
//!     let library = ImageLibrary::new(
//!         store,
//!         "public",
//!         "https://images.example.com",
//!         vec!["references".to_string(), "logos".to_string()],
//!     );
//!
//!     let router = create_router(library, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod qr;
pub mod server;
pub mod store;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{LibraryError, QrError, StoreError};
pub use library::{ImageLibrary, UsageReport};
pub use server::{create_router, AppState, RouterConfig};
pub use store::{ContentStore, GithubStore};

//! Content store abstraction layer.
//!
//! The gateway never touches disk; every blob and every metadata sidecar
//! lives in a remote version-controlled content store. This module defines
//! the [`ContentStore`] trait that the rest of the crate is written against,
//! plus the GitHub contents API implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            ImageLibrary                 │
//! │  (folders, uploads, metadata, stats)    │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          ContentStore Trait             │
//! │   list_dir / get_file / put / delete    │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             GithubStore                 │
//! │    (repository contents API, HTTPS)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Updates follow the store's optimistic pattern: writes to an existing
//! path must carry the version token (`sha`) returned by a prior read.

mod github;

pub use github::GithubStore;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

// =============================================================================
// Store Types
// =============================================================================

/// Kind of a directory entry in the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file (blob)
    File,
    /// A directory
    Dir,
}

/// A single entry in a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// File or directory name (no path components)
    pub name: String,

    /// Size in bytes (0 for directories)
    pub size: u64,

    /// Whether this entry is a file or a directory
    pub kind: EntryKind,

    /// Direct download URL for files, if the store exposes one
    pub download_url: Option<String>,
}

impl DirEntry {
    /// Whether this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A file fetched from the content store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Decoded file content
    pub content: Bytes,

    /// Version token of this revision, required for updates and deletes
    pub sha: String,
}

/// Outcome of a successful write to the content store.
#[derive(Debug, Clone, Default)]
pub struct PutOutcome {
    /// Link to the commit that recorded the write, if the store provides one
    pub commit_url: Option<String>,
}

// =============================================================================
// Store Trait
// =============================================================================

/// Interface to the remote content store.
///
/// Paths are repository-relative, slash-separated and never start with `/`
/// (e.g. `public/logos/acme.png`). Implementations map [`StoreError::NotFound`]
/// from the store's own "missing path" signal so callers can distinguish
/// absence from transport failure.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List the entries of a directory.
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError>;

    /// Fetch a file's content and version token.
    async fn get_file(&self, path: &str) -> Result<StoredFile, StoreError>;

    /// Create or update a file.
    ///
    /// `sha` must be the current version token when updating an existing
    /// path, and `None` when creating a new one.
    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<PutOutcome, StoreError>;

    /// Delete a file at its current version token.
    async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<(), StoreError>;
}

//! Image library domain layer.
//!
//! [`ImageLibrary`] owns the layout of the content store (folders under a
//! configurable root, one `metadata.json` sidecar per folder) and the
//! public URL scheme images are served from. It is generic over
//! [`ContentStore`] so tests can drive it with an in-memory store.
//!
//! # Store Layout
//!
//! ```text
//! {root}/
//!   {folder}/
//!     metadata.json        <- filename -> { tags, description, uploadedAt }
//!     some-image.png
//!     another.jpg
//! ```

mod metadata;
mod stats;

pub use metadata::{MetadataEntry, MetadataMap};
pub use stats::{FolderStat, TagCount, UploadRecord, UsageReport, UsageSummary};

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{LibraryError, StoreError};
use crate::store::ContentStore;

/// File extensions recognized as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// File extensions offered in download manifests (images plus documents,
/// video and audio).
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "pdf", "mp4", "mov", "webm", "mp3", "wav",
];

/// Check whether a filename carries one of the given extensions
/// (case-insensitive).
pub fn has_extension(name: &str, extensions: &[&str]) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| *e == ext)
        }
        _ => false,
    }
}

// =============================================================================
// Response Records
// =============================================================================

/// One image in a catalog listing, with its metadata merged in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// File name within its folder
    pub name: String,

    /// Folder the image lives in
    pub folder: String,

    /// Public view URL
    pub url: String,

    /// Direct download URL from the store, if available
    pub raw_url: Option<String>,

    /// Size in bytes
    pub size: u64,

    /// Comma-separated tags, if the image has metadata
    pub tags: Option<String>,

    /// Free-text description, if the image has metadata
    pub description: Option<String>,

    /// Upload timestamp (RFC 3339), if recorded
    pub uploaded_at: Option<String>,
}

/// One entry of a download manifest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    /// File name within the folder
    pub name: String,

    /// Direct download URL from the store
    pub download_url: Option<String>,

    /// Public view URL
    pub view_url: String,

    /// Size in bytes
    pub size: u64,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Public view URL of the uploaded image
    pub url: String,

    /// Link to the commit that recorded the upload, if available
    pub commit_url: Option<String>,
}

// =============================================================================
// ImageLibrary
// =============================================================================

/// Domain service for the image hosting workflow.
pub struct ImageLibrary<S: ContentStore> {
    store: Arc<S>,
    root: String,
    public_base_url: String,
    default_folders: Vec<String>,
}

impl<S: ContentStore> ImageLibrary<S> {
    /// Create a new library over the given store.
    ///
    /// # Arguments
    /// * `store` - Content store collaborator
    /// * `root` - Path prefix inside the repository (e.g. `public`)
    /// * `public_base_url` - Base URL images are served from
    /// * `default_folders` - Folders queried when a listing names none
    pub fn new(
        store: S,
        root: impl Into<String>,
        public_base_url: impl Into<String>,
        default_folders: Vec<String>,
    ) -> Self {
        Self {
            store: Arc::new(store),
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            default_folders,
        }
    }

    /// The content store this library operates on.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Folders queried when a listing request does not name one.
    pub fn default_folders(&self) -> &[String] {
        &self.default_folders
    }

    // =========================================================================
    // Path and URL layout
    // =========================================================================

    /// Repository path of a folder.
    pub(crate) fn folder_path(&self, folder: &str) -> String {
        format!("{}/{}", self.root, folder)
    }

    /// Repository path of a file within a folder.
    fn file_path(&self, folder: &str, filename: &str) -> String {
        format!("{}/{}/{}", self.root, folder, filename)
    }

    /// Repository path of a folder's metadata sidecar.
    pub(crate) fn metadata_path(&self, folder: &str) -> String {
        format!("{}/{}/metadata.json", self.root, folder)
    }

    /// Public view URL of a file.
    pub fn public_url(&self, folder: &str, filename: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, folder, filename)
    }

    // =========================================================================
    // Folders
    // =========================================================================

    /// List all folders under the content root.
    pub async fn list_folders(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.store.list_dir(&self.root).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir())
            .map(|e| e.name)
            .collect())
    }

    /// Create a new folder, seeding it with a README so the store records
    /// the directory.
    ///
    /// The name is sanitized to `[a-z0-9-_]` before use; the sanitized name
    /// is returned.
    pub async fn create_folder(&self, name: &str) -> Result<String, LibraryError> {
        if name.is_empty() {
            return Err(LibraryError::MissingField("name"));
        }

        let safe_name = sanitize_folder_name(name);
        let path = format!("{}/{}/README.md", self.root, safe_name);
        let readme = format!("# {}\n\nCustom folder for images.\n", name);

        self.store
            .put_file(
                &path,
                readme.as_bytes(),
                &format!("Create folder: {}", safe_name),
                None,
            )
            .await?;

        Ok(safe_name)
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// List images, merging per-file metadata.
    ///
    /// When `folder` is `None`, the configured default folders are queried.
    /// A folder whose listing fails contributes nothing; the remaining
    /// folders are still processed.
    pub async fn list_images(&self, folder: Option<&str>) -> Vec<ImageRecord> {
        let folders: Vec<String> = match folder {
            Some(f) => vec![f.to_string()],
            None => self.default_folders.clone(),
        };

        let mut records = Vec::new();

        for folder in &folders {
            let entries = match self.store.list_dir(&self.folder_path(folder)).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(folder = %folder, error = %e, "Skipping unlistable folder");
                    continue;
                }
            };

            let metadata = self.metadata_or_empty(folder).await.0;

            for entry in entries.into_iter().filter(|e| e.is_file()) {
                if !has_extension(&entry.name, IMAGE_EXTENSIONS) {
                    continue;
                }

                let meta = metadata.get(&entry.name);
                records.push(ImageRecord {
                    url: self.public_url(folder, &entry.name),
                    folder: folder.clone(),
                    raw_url: entry.download_url,
                    size: entry.size,
                    tags: meta.and_then(|m| m.tags.clone()),
                    description: meta.and_then(|m| m.description.clone()),
                    uploaded_at: meta.and_then(|m| m.uploaded_at.clone()),
                    name: entry.name,
                });
            }
        }

        records
    }

    /// Upload an image into a folder.
    ///
    /// Writes the blob, then records a metadata entry with the upload
    /// timestamp (and any tags/description supplied). A metadata write
    /// failure does not fail the upload; the blob is already durable.
    pub async fn upload(
        &self,
        folder: &str,
        filename: &str,
        content: &[u8],
        tags: Option<&str>,
        description: Option<&str>,
    ) -> Result<UploadOutcome, LibraryError> {
        let path = self.file_path(folder, filename);

        let outcome = self
            .store
            .put_file(&path, content, &format!("Upload {}", filename), None)
            .await?;

        if let Err(e) = self
            .record_upload_metadata(folder, filename, tags, description)
            .await
        {
            warn!(folder = %folder, filename = %filename, error = %e,
                "Failed to record upload metadata");
        }

        Ok(UploadOutcome {
            url: self.public_url(folder, filename),
            commit_url: outcome.commit_url,
        })
    }

    /// Delete an image, then scrub its metadata entry.
    ///
    /// Returns [`StoreError::NotFound`] if the file does not exist. A failed
    /// metadata scrub is logged and swallowed.
    pub async fn delete(&self, folder: &str, filename: &str) -> Result<(), LibraryError> {
        let path = self.file_path(folder, filename);

        // The store needs the current version token to delete
        let file = self.store.get_file(&path).await?;
        self.store
            .delete_file(&path, &format!("Delete {}", filename), &file.sha)
            .await?;

        if let Err(e) = self.remove_metadata_entry(folder, filename).await {
            warn!(folder = %folder, filename = %filename, error = %e,
                "Failed to remove metadata entry");
        }

        Ok(())
    }

    // =========================================================================
    // Downloads
    // =========================================================================

    /// Build a download manifest for a folder's media files.
    ///
    /// Returns [`LibraryError::EmptyFolder`] when the folder exists but
    /// holds no recognized media files.
    pub async fn download_manifest(&self, folder: &str) -> Result<Vec<DownloadLink>, LibraryError> {
        let entries = self.store.list_dir(&self.folder_path(folder)).await?;

        let links: Vec<DownloadLink> = entries
            .into_iter()
            .filter(|e| e.is_file() && has_extension(&e.name, MEDIA_EXTENSIONS))
            .map(|e| DownloadLink {
                view_url: self.public_url(folder, &e.name),
                download_url: e.download_url,
                size: e.size,
                name: e.name,
            })
            .collect();

        if links.is_empty() {
            return Err(LibraryError::EmptyFolder(folder.to_string()));
        }

        Ok(links)
    }
}

/// Sanitize a user-supplied folder name.
///
/// Lowercases, maps every character outside `[a-z0-9-_]` to `-`, and
/// collapses runs of `-`.
pub fn sanitize_folder_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = false;

    for c in name.to_lowercase().chars() {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            c
        } else {
            '-'
        };

        if mapped == '-' {
            if !last_dash {
                out.push('-');
            }
            last_dash = true;
        } else {
            out.push(mapped);
            last_dash = false;
        }
    }

    out
}

// =============================================================================
// Test Support
// =============================================================================


// =============================================================================
// Tests
// =============================================================================

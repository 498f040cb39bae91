//! Per-folder metadata sidecars.
//!
//! Each folder carries one `metadata.json` mapping filenames to their
//! tags, description and timestamps. The sidecar is updated with the
//! store's read-modify-write pattern: read the current revision and its
//! version token, mutate the mapping, write it back against that token.
//!
//! Reads are deliberately forgiving: a missing or unparseable sidecar is
//! treated as an empty mapping, never as an error. Listing and statistics
//! are advisory; a broken sidecar must not take a folder offline.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{LibraryError, StoreError};
use crate::store::ContentStore;

use super::ImageLibrary;

/// Metadata recorded for a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataEntry {
    /// Comma-separated free-text tags
    pub tags: Option<String>,

    /// Free-text description
    pub description: Option<String>,

    /// When the file was uploaded (RFC 3339)
    pub uploaded_at: Option<String>,

    /// When the entry was last edited (RFC 3339)
    pub updated_at: Option<String>,
}

impl MetadataEntry {
    /// Whether this entry carries at least one non-empty tag string.
    pub fn is_tagged(&self) -> bool {
        self.tags.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A folder's metadata mapping, keyed by filename.
pub type MetadataMap = BTreeMap<String, MetadataEntry>;

/// Current timestamp in the RFC 3339 millisecond format used throughout
/// the sidecars.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl<S: ContentStore> ImageLibrary<S> {
    /// Read a folder's metadata mapping, degrading to empty on any failure.
    ///
    /// Returns the mapping and the sidecar's version token when the file
    /// exists (even if its content did not parse; a later write then
    /// replaces the corrupt revision).
    pub async fn metadata_or_empty(&self, folder: &str) -> (MetadataMap, Option<String>) {
        let path = self.metadata_path(folder);

        let file = match self.store().get_file(&path).await {
            Ok(file) => file,
            Err(StoreError::NotFound(_)) => return (MetadataMap::new(), None),
            Err(e) => {
                warn!(folder = %folder, error = %e, "Metadata read failed, treating as empty");
                return (MetadataMap::new(), None);
            }
        };

        match serde_json::from_slice::<MetadataMap>(&file.content) {
            Ok(map) => (map, Some(file.sha)),
            Err(e) => {
                warn!(folder = %folder, error = %e, "Metadata did not parse, treating as empty");
                (MetadataMap::new(), Some(file.sha))
            }
        }
    }

    /// Set tags and description for a file.
    ///
    /// An existing `uploadedAt` is preserved; `updatedAt` is stamped with
    /// the current time. Returns the entry as written.
    pub async fn update_metadata(
        &self,
        folder: &str,
        filename: &str,
        tags: Option<&str>,
        description: Option<&str>,
    ) -> Result<MetadataEntry, LibraryError> {
        let (mut map, sha) = self.metadata_or_empty(folder).await;

        let uploaded_at = map.get(filename).and_then(|e| e.uploaded_at.clone());
        let entry = MetadataEntry {
            tags: tags.map(str::to_string),
            description: description.map(str::to_string),
            uploaded_at,
            updated_at: Some(now_timestamp()),
        };
        map.insert(filename.to_string(), entry.clone());

        self.write_metadata(folder, &map, sha.as_deref(), &format!("Update metadata for {}", filename))
            .await?;

        Ok(entry)
    }

    /// Record an upload in the folder's metadata.
    pub(crate) async fn record_upload_metadata(
        &self,
        folder: &str,
        filename: &str,
        tags: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), LibraryError> {
        let (mut map, sha) = self.metadata_or_empty(folder).await;

        map.insert(
            filename.to_string(),
            MetadataEntry {
                tags: tags.map(str::to_string),
                description: description.map(str::to_string),
                uploaded_at: Some(now_timestamp()),
                updated_at: None,
            },
        );

        self.write_metadata(folder, &map, sha.as_deref(), &format!("Record upload of {}", filename))
            .await
    }

    /// Remove a file's entry from the folder's metadata, if present.
    pub(crate) async fn remove_metadata_entry(
        &self,
        folder: &str,
        filename: &str,
    ) -> Result<(), LibraryError> {
        let (mut map, sha) = self.metadata_or_empty(folder).await;

        if map.remove(filename).is_none() {
            debug!(folder = %folder, filename = %filename, "No metadata entry to remove");
            return Ok(());
        }

        self.write_metadata(folder, &map, sha.as_deref(), &format!("Remove metadata for {}", filename))
            .await
    }

    /// Serialize and write a folder's metadata mapping back to the store.
    async fn write_metadata(
        &self,
        folder: &str,
        map: &MetadataMap,
        sha: Option<&str>,
        message: &str,
    ) -> Result<(), LibraryError> {
        let path = self.metadata_path(folder);
        let content = serde_json::to_vec_pretty(map)
            .map_err(|e| LibraryError::InvalidPayload(e.to_string()))?;

        self.store().put_file(&path, &content, message, sha).await?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Usage statistics aggregation.
//!
//! One pass over the library's folders producing a combined report: totals,
//! per-folder subtotals, the most recent uploads and the most frequent tags.
//!
//! The aggregator is strictly best-effort and never fails: a folder whose
//! listing cannot be fetched is skipped, a missing or unreadable metadata
//! sidecar counts as empty. The report is advisory analytics, recomputed
//! from the live store on every request.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::debug;

use crate::store::ContentStore;

use super::metadata::now_timestamp;
use super::{has_extension, ImageLibrary, IMAGE_EXTENSIONS};

/// Maximum number of entries in the recent uploads list.
pub const RECENT_UPLOADS_LIMIT: usize = 10;

/// Maximum number of entries in the top tags list.
pub const TOP_TAGS_LIMIT: usize = 20;

// =============================================================================
// Report Types
// =============================================================================

/// Per-folder image count and byte size.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct FolderStat {
    /// Number of images in the folder
    pub count: usize,

    /// Total byte size of those images
    pub size: u64,
}

/// One upload in the recent uploads list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// File name
    pub name: String,

    /// Folder the file lives in
    pub folder: String,

    /// Public view URL
    pub url: String,

    /// Upload timestamp as recorded in the metadata
    pub uploaded_at: String,
}

/// Occurrence count of one normalized tag.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagCount {
    /// Normalized tag (trimmed, lowercased)
    pub tag: String,

    /// Number of files carrying this tag
    pub count: usize,
}

/// Headline totals of a usage report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    /// Total number of images across all processed folders
    pub total_images: usize,

    /// Total byte size of those images
    pub total_size: u64,

    /// Total size in megabytes, formatted with two decimals
    #[serde(rename = "totalSizeMB")]
    pub total_size_mb: String,

    /// Number of images carrying at least one tag
    pub total_tagged: usize,

    /// Tagged images as a rounded percentage of all images (0 when empty)
    pub percent_tagged: u32,

    /// Number of folders the report covers
    pub folder_count: usize,
}

/// The full usage report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// Headline totals
    pub summary: UsageSummary,

    /// Per-folder subtotals, keyed by folder name
    pub folders: BTreeMap<String, FolderStat>,

    /// Most recent uploads, newest first, at most [`RECENT_UPLOADS_LIMIT`]
    pub recent_uploads: Vec<UploadRecord>,

    /// Most frequent tags, highest count first, at most [`TOP_TAGS_LIMIT`]
    pub top_tags: Vec<TagCount>,

    /// When this report was generated (RFC 3339)
    pub generated_at: String,
}

// =============================================================================
// Aggregation
// =============================================================================

impl<S: ContentStore> ImageLibrary<S> {
    /// Aggregate usage statistics across the given folders.
    ///
    /// This never fails: folders that cannot be listed are skipped, and a
    /// folder without readable metadata contributes no tagged files or
    /// upload records.
    pub async fn usage_report(&self, folders: &[String]) -> UsageReport {
        let mut folder_stats: BTreeMap<String, FolderStat> = BTreeMap::new();
        let mut total_images = 0usize;
        let mut total_size = 0u64;
        let mut total_tagged = 0usize;
        let mut recent_uploads: Vec<UploadRecord> = Vec::new();

        // Tag counts keep insertion order so equal counts sort stably
        let mut tag_counts: Vec<TagCount> = Vec::new();
        let mut tag_index: HashMap<String, usize> = HashMap::new();

        for folder in folders {
            let entries = match self.store().list_dir(&self.folder_path(folder)).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(folder = %folder, error = %e, "Folder skipped in usage report");
                    continue;
                }
            };

            let metadata = self.metadata_or_empty(folder).await.0;

            let mut stat = FolderStat::default();

            for entry in entries.iter().filter(|e| e.is_file()) {
                if !has_extension(&entry.name, IMAGE_EXTENSIONS) {
                    continue;
                }

                stat.count += 1;
                stat.size += entry.size;

                let Some(meta) = metadata.get(&entry.name) else {
                    continue;
                };

                if meta.is_tagged() {
                    total_tagged += 1;
                    for tag in normalize_tags(meta.tags.as_deref().unwrap_or_default()) {
                        match tag_index.get(&tag) {
                            Some(&i) => tag_counts[i].count += 1,
                            None => {
                                tag_index.insert(tag.clone(), tag_counts.len());
                                tag_counts.push(TagCount { tag, count: 1 });
                            }
                        }
                    }
                }

                if let Some(uploaded_at) = &meta.uploaded_at {
                    recent_uploads.push(UploadRecord {
                        name: entry.name.clone(),
                        folder: folder.clone(),
                        url: self.public_url(folder, &entry.name),
                        uploaded_at: uploaded_at.clone(),
                    });
                }
            }

            total_images += stat.count;
            total_size += stat.size;
            folder_stats.insert(folder.clone(), stat);
        }

        // Newest first; timestamps that do not parse sort last
        let mut keyed: Vec<(Option<DateTime<FixedOffset>>, UploadRecord)> = recent_uploads
            .into_iter()
            .map(|r| (DateTime::parse_from_rfc3339(&r.uploaded_at).ok(), r))
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        let recent_uploads: Vec<UploadRecord> = keyed
            .into_iter()
            .take(RECENT_UPLOADS_LIMIT)
            .map(|(_, r)| r)
            .collect();

        tag_counts.sort_by(|a, b| b.count.cmp(&a.count));
        tag_counts.truncate(TOP_TAGS_LIMIT);

        let percent_tagged = if total_images > 0 {
            ((total_tagged as f64 / total_images as f64) * 100.0).round() as u32
        } else {
            0
        };

        UsageReport {
            summary: UsageSummary {
                total_images,
                total_size,
                total_size_mb: format!("{:.2}", total_size as f64 / (1024.0 * 1024.0)),
                total_tagged,
                percent_tagged,
                folder_count: folders.len(),
            },
            folders: folder_stats,
            recent_uploads,
            top_tags: tag_counts,
            generated_at: now_timestamp(),
        }
    }
}

/// Split a comma-separated tag string into normalized tags.
///
/// Tokens are trimmed and lowercased; empty tokens are dropped.
pub fn normalize_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

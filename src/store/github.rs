//! GitHub contents API implementation of `ContentStore`.
//!
//! Every operation maps to a single call on
//! `{api_base}/repos/{owner}/{repo}/contents/{path}`:
//!
//! - `GET` on a directory returns a JSON array of entries
//! - `GET` on a file returns a JSON object with base64 content and a sha
//! - `PUT` creates or (with a sha) updates a file
//! - `DELETE` removes a file at a given sha
//!
//! The access token is attached as a `token` authorization header on every
//! request; there is no other authentication logic in this crate.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::StoreError;

use super::{ContentStore, DirEntry, EntryKind, PutOutcome, StoredFile};

/// Media type requested from the contents API.
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

// =============================================================================
// Wire Types
// =============================================================================

/// One entry of a directory listing, as returned by the contents API.
#[derive(Debug, Deserialize)]
struct ApiEntry {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// A file object, as returned by the contents API.
#[derive(Debug, Deserialize)]
struct ApiFile {
    sha: String,
    #[serde(default)]
    content: String,
}

/// Response to a successful PUT.
#[derive(Debug, Deserialize)]
struct ApiPutResponse {
    #[serde(default)]
    commit: Option<ApiCommit>,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    #[serde(default)]
    html_url: Option<String>,
}

/// Error body returned by the contents API.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

// =============================================================================
// GithubStore
// =============================================================================

/// `ContentStore` backed by a GitHub repository's contents API.
#[derive(Clone)]
pub struct GithubStore {
    client: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubStore {
    /// Create a new store client for the given repository.
    ///
    /// # Arguments
    /// * `api_base` - Contents API base URL (e.g. `https://api.github.com`)
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `token` - Access token passed through on every request
    pub fn new(
        api_base: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("imgbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    /// Repository owner this store talks to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name this store talks to.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build the contents API URL for a repository-relative path.
    fn contents_url(&self, path: &str) -> String {
        // Escape each segment but keep the separators
        let escaped: Vec<String> = path
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.owner,
            self.repo,
            escaped.join("/")
        )
    }

    /// Attach the standard headers to a request builder.
    fn with_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("token {}", self.token))
            .header("Accept", ACCEPT_HEADER)
    }

    /// Map a non-success response to a `StoreError`, consuming the body.
    async fn error_for(path: &str, response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        if status == 404 {
            return StoreError::NotFound(path.to_string());
        }

        let message = response
            .json::<ApiError>()
            .await
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| "request failed".to_string());

        StoreError::Api { status, message }
    }
}

fn connection_error(err: reqwest::Error) -> StoreError {
    StoreError::Connection(err.to_string())
}

#[async_trait]
impl ContentStore for GithubStore {
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        let url = self.contents_url(path);
        let response = self
            .with_headers(self.client.get(&url))
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for(path, response).await);
        }

        let entries: Vec<ApiEntry> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("listing of {}: {}", path, e)))?;

        Ok(entries
            .into_iter()
            .map(|e| DirEntry {
                kind: if e.entry_type == "dir" {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                },
                name: e.name,
                size: e.size,
                download_url: e.download_url,
            })
            .collect())
    }

    async fn get_file(&self, path: &str) -> Result<StoredFile, StoreError> {
        let url = self.contents_url(path);
        let response = self
            .with_headers(self.client.get(&url))
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for(path, response).await);
        }

        let file: ApiFile = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("file object at {}: {}", path, e)))?;

        // The API wraps base64 content at 60 columns; strip whitespace first
        let compact: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
        let content = BASE64
            .decode(compact.as_bytes())
            .map_err(|e| StoreError::Decode(format!("base64 content at {}: {}", path, e)))?;

        Ok(StoredFile {
            content: Bytes::from(content),
            sha: file.sha,
        })
    }

    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<PutOutcome, StoreError> {
        let url = self.contents_url(path);

        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content),
        });
        if let Some(sha) = sha {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }

        let response = self
            .with_headers(self.client.put(&url))
            .json(&body)
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for(path, response).await);
        }

        let put: ApiPutResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("put response for {}: {}", path, e)))?;

        Ok(PutOutcome {
            commit_url: put.commit.and_then(|c| c.html_url),
        })
    }

    async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<(), StoreError> {
        let url = self.contents_url(path);

        let body = serde_json::json!({
            "message": message,
            "sha": sha,
        });

        let response = self
            .with_headers(self.client.delete(&url))
            .json(&body)
            .send()
            .await
            .map_err(connection_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for(path, response).await);
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Git repository source, via a GitHub-compatible REST API.
//!
//! Workflow:
//! 1. List the tree of `branch` recursively (`/git/trees/{branch}?recursive=1`).
//! 2. Keep markdown blobs under the configured `path` prefix.
//! 3. Fetch each blob (`/git/blobs/{sha}`) with bounded concurrency, keeping
//!    tree order, and base64-decode it.
//! 4. Normalize with the path relative to the prefix.
//!
//! No local clone is made. A failed tree listing yields an empty source;
//! a failed blob is skipped.

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{GitSourceConfig, GITHUB_API_BASE};
use crate::error::SourceError;
use crate::markdown::{is_markdown_path, normalize};
use crate::models::{Document, Origin};
use crate::traits::Source;

pub struct GitSource {
    name: String,
    config: GitSourceConfig,
    client: Client,
    headers: HeaderMap,
    concurrency: usize,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    #[serde(default)]
    encoding: String,
}

impl GitSource {
    pub fn new(config: GitSourceConfig, client: Client, concurrency: usize) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut v) => {
                    v.set_sensitive(true);
                    headers.insert(AUTHORIZATION, v);
                }
                Err(_) => warn!(repo = %config.repo, "git token is not a valid header value"),
            }
        }

        Self {
            name: format!("{}@{}", config.repo, config.branch),
            config,
            client,
            headers,
            concurrency: concurrency.max(1),
        }
    }

    fn api_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.repo,
            suffix
        )
    }

    /// Normalized prefix: no leading/trailing slashes, empty for repo root.
    fn prefix(&self) -> &str {
        self.config
            .path
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .unwrap_or("")
    }

    async fn list_tree(&self) -> Result<Vec<TreeEntry>, SourceError> {
        let url = self.api_url(&format!("git/trees/{}?recursive=1", self.config.branch));
        let resp = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::unavailable(url, format!("HTTP {}", status)));
        }
        let body: TreeResponse = resp.json().await?;
        if body.truncated {
            warn!(source = %self.name, "tree listing was truncated by the API");
        }
        Ok(body.tree)
    }

    async fn fetch_blob(&self, entry: &TreeEntry) -> Result<String, SourceError> {
        let url = self.api_url(&format!("git/blobs/{}", entry.sha));
        let resp = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::unavailable(url, format!("HTTP {}", status)));
        }
        let blob: BlobResponse = resp.json().await?;
        decode_blob(&blob).map_err(|reason| SourceError::malformed(&entry.path, reason))
    }

    /// Browsable location for a blob path.
    fn source_path(&self, full_path: &str) -> String {
        if self.config.api_base.trim_end_matches('/') == GITHUB_API_BASE {
            format!(
                "https://github.com/{}/blob/{}/{}",
                self.config.repo, self.config.branch, full_path
            )
        } else {
            full_path.to_string()
        }
    }

    async fn load_entry(&self, entry: TreeEntry) -> Option<Document> {
        let raw = match self.fetch_blob(&entry).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %entry.path, error = %e, "skipping git blob");
                return None;
            }
        };
        let relative = relative_to_prefix(&entry.path, self.prefix());
        match normalize(&raw, relative, Origin::Git) {
            Some(mut doc) => {
                doc.source_path = self.source_path(&entry.path);
                Some(doc)
            }
            None => {
                debug!(path = %entry.path, "skipping git blob with empty body");
                None
            }
        }
    }
}

#[async_trait]
impl Source for GitSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Markdown blobs from a git repository via the REST API"
    }

    fn source_type(&self) -> &str {
        "git"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        let tree = match self.list_tree().await {
            Ok(tree) => tree,
            Err(e) => {
                warn!(source = %self.name, error = %e, "git tree listing failed");
                return Ok(Vec::new());
            }
        };

        let prefix = self.prefix();
        let entries: Vec<TreeEntry> = tree
            .into_iter()
            .filter(|e| e.kind == "blob" && is_markdown_path(&e.path) && under_prefix(&e.path, prefix))
            .collect();

        info!(source = %self.name, blobs = entries.len(), "fetching git blobs");

        let docs: Vec<Option<Document>> = stream::iter(entries)
            .map(|entry| self.load_entry(entry))
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(docs.into_iter().flatten().collect())
    }
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn relative_to_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    path.strip_prefix(prefix)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(path)
}

fn decode_blob(blob: &BlobResponse) -> std::result::Result<String, String> {
    match blob.encoding.as_str() {
        "base64" | "" => {
            let compact: String = blob.content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD.decode(compact.as_bytes()).map_err(|e| e.to_string())?;
            String::from_utf8(bytes).map_err(|e| e.to_string())
        }
        "utf-8" | "utf8" => Ok(blob.content.clone()),
        other => Err(format!("unsupported blob encoding '{}'", other)),
    }
}

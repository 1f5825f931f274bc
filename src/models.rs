//! Core data models used throughout Standards Hub.
//!
//! These types represent the documents, metadata projections, and search
//! results that flow from the source adapters through the aggregator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The kind of source a document was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
    Git,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Local => "local",
            Origin::Remote => "remote",
            Origin::Git => "git",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category assigned when neither front matter nor path provide one.
pub const DEFAULT_CATEGORY: &str = "custom";

/// A normalized standard document.
///
/// Produced once by a source adapter and never mutated afterwards. The
/// `content` field is always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub version: Option<String>,
    pub last_updated: Option<String>,
    pub origin: Origin,
    /// Relative path (local, git) or URL (remote) the document came from.
    pub source_path: String,
    pub content: String,
    pub front_matter: Map<String, Value>,
}

impl Document {
    /// Metadata projection: everything except `content` and `front_matter`.
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            tags: self.tags.clone(),
            version: self.version.clone(),
            last_updated: self.last_updated.clone(),
            origin: self.origin,
            source_path: self.source_path.clone(),
        }
    }
}

/// Lightweight listing shape returned by the list and category queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub version: Option<String>,
    pub last_updated: Option<String>,
    pub origin: Origin,
    pub source_path: String,
}

/// A single ranked search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub standard: DocumentMeta,
    pub relevance: u32,
}

/// Ranked search output: the truncated hit list plus the untruncated count.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            total: 0,
            results: Vec::new(),
        }
    }
}

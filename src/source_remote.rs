//! Remote HTTP source.
//!
//! Three mutually exclusive modes, chosen in priority order:
//!
//! | Condition | Mode |
//! |-----------|------|
//! | `docs` is non-empty | fetch each listed URL as one raw markdown file |
//! | `url` ends in `.md` / `.markdown` | fetch `url` as one raw markdown file |
//! | otherwise | `url` is a JSON API returning `{ "standards": [...] }` or `{ "data": [...] }` |
//!
//! A JSON record whose `content` carries a front matter block is run through
//! the normalizer; any other record is taken as an already-formed document.
//! Each URL and each record fails independently.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::RemoteSourceConfig;
use crate::error::SourceError;
use crate::frontmatter;
use crate::http::{get_text, header_map};
use crate::markdown::{is_markdown_path, normalize};
use crate::models::{Document, Origin, DEFAULT_CATEGORY};
use crate::traits::Source;

pub struct RemoteSource {
    config: RemoteSourceConfig,
    client: Client,
    headers: HeaderMap,
}

impl RemoteSource {
    pub fn new(config: RemoteSourceConfig, client: Client) -> Self {
        let headers = header_map(&config.headers);
        Self {
            config,
            client,
            headers,
        }
    }

    async fn fetch_markdown(&self, url: &str) -> Result<Option<Document>, SourceError> {
        let raw = get_text(&self.client, url, &self.headers).await?;
        Ok(normalize(&raw, &logical_path_for_url(url), Origin::Remote).map(|mut doc| {
            doc.source_path = url.to_string();
            doc
        }))
    }

    async fn load_markdown_urls(&self, urls: &[String]) -> Vec<Document> {
        let mut docs = Vec::new();
        for url in urls {
            match self.fetch_markdown(url).await {
                Ok(Some(doc)) => docs.push(doc),
                Ok(None) => debug!(url = %url, "skipping remote markdown with empty body"),
                Err(e) => warn!(url = %url, error = %e, "skipping remote markdown"),
            }
        }
        docs
    }

    async fn load_api(&self) -> Result<Vec<Document>, SourceError> {
        let url = &self.config.url;
        let body = get_text(&self.client, url, &self.headers).await?;
        let records = parse_api_body(&body).map_err(|reason| SourceError::malformed(url, reason))?;

        let mut docs = Vec::new();
        for (i, record) in records.into_iter().enumerate() {
            match record_to_document(record, url) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(url = %url, index = i, error = %e, "skipping remote record"),
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl Source for RemoteSource {
    fn name(&self) -> &str {
        &self.config.url
    }

    fn description(&self) -> &str {
        "Standards served over HTTP as JSON or raw markdown"
    }

    fn source_type(&self) -> &str {
        "remote"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        if !self.config.docs.is_empty() {
            return Ok(self.load_markdown_urls(&self.config.docs).await);
        }

        if is_markdown_path(url_path(&self.config.url)) {
            return Ok(self
                .load_markdown_urls(std::slice::from_ref(&self.config.url))
                .await);
        }

        match self.load_api().await {
            Ok(docs) => Ok(docs),
            Err(e) => {
                warn!(url = %self.config.url, error = %e, "remote source unavailable");
                Ok(Vec::new())
            }
        }
    }
}

/// The path part of a URL, ignoring query string and fragment.
fn url_path(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    &raw[..end]
}

/// Logical path used for id/category derivation of a raw markdown URL.
///
/// When the URL path contains a `standards` directory, everything before it
/// is dropped, so hosting prefixes do not leak into ids:
///
/// `https://raw.githubusercontent.com/acme/std/main/standards/frontend/vue.md`
/// → `standards/frontend/vue.md`.
///
/// Otherwise the whole URL path is used.
pub fn logical_path_for_url(raw: &str) -> String {
    let path = match url::Url::parse(raw) {
        Ok(u) => u.path().trim_start_matches('/').to_string(),
        Err(_) => {
            return url_path(raw)
                .rsplit('/')
                .next()
                .unwrap_or(raw)
                .to_string()
        }
    };

    let segments: Vec<&str> = path.split('/').collect();
    let dirs = &segments[..segments.len().saturating_sub(1)];
    match dirs.iter().position(|s| *s == "standards") {
        Some(i) => segments[i..].join("/"),
        None => path.clone(),
    }
}

/// Extract the record array from an API response body.
fn parse_api_body(body: &str) -> std::result::Result<Vec<Value>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            for key in ["standards", "data"] {
                if let Some(Value::Array(items)) = obj.remove(key) {
                    return Ok(items);
                }
            }
            Err("expected a `standards` or `data` array".to_string())
        }
        _ => Err("expected a JSON object".to_string()),
    }
}

/// Remote JSON record shape. Every field is optional on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteRecord {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    content: Option<String>,
    version: Option<Value>,
    last_updated: Option<String>,
    path: Option<String>,
}

fn record_to_document(value: Value, api_url: &str) -> Result<Document, SourceError> {
    let record: RemoteRecord = serde_json::from_value(value.clone())
        .map_err(|e| SourceError::malformed(api_url, e.to_string()))?;

    let content = record.content.as_deref().unwrap_or("");

    if frontmatter::has_front_matter(content) {
        let logical_path = record.path.clone().unwrap_or_else(|| {
            let name = record.id.as_deref().unwrap_or("remote");
            match record.category.as_deref() {
                Some(cat) => format!("{}/{}.md", cat, name),
                None => format!("{}.md", name),
            }
        });
        let mut doc = normalize(content, &logical_path, Origin::Remote)
            .ok_or_else(|| SourceError::malformed(&logical_path, "empty body"))?;
        doc.source_path = api_url.to_string();
        return Ok(doc);
    }

    let id = record
        .id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SourceError::malformed(api_url, "record has no id"))?;
    let content = content.trim();
    if content.is_empty() {
        return Err(SourceError::malformed(&id, "record has no content"));
    }

    let front_matter = match value {
        Value::Object(mut obj) => {
            obj.remove("content");
            obj
        }
        _ => Map::new(),
    };

    Ok(Document {
        title: record.title.unwrap_or_else(|| id.clone()),
        description: record.description,
        category: record
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        subcategory: record.subcategory,
        tags: record
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        version: record.version.as_ref().and_then(frontmatter::scalar_string),
        last_updated: record.last_updated,
        origin: Origin::Remote,
        source_path: record.path.unwrap_or_else(|| api_url.to_string()),
        content: content.to_string(),
        front_matter,
        id,
    })
}

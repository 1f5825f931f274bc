//! The source abstraction.
//!
//! Every origin of standards (local directory, HTTP endpoint, git
//! repository) implements [`Source`]. The aggregator holds an ordered
//! [`SourceRegistry`] and merges results in registration order.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              SourceRegistry              │
//! │  ┌─────────┐ ┌─────────┐ ┌────────────┐  │
//! │  │  Local  │ │ Remote  │ │    Git     │  │
//! │  └─────────┘ └─────────┘ └────────────┘  │
//! └──────────────┬───────────────────────────┘
//!                ▼
//!      StandardsManager::load_documents()
//! ```

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::models::Document;

/// An origin that produces normalized documents.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use standards_hub::models::Document;
/// use standards_hub::traits::Source;
///
/// pub struct StaticSource {
///     docs: Vec<Document>,
/// }
///
/// #[async_trait]
/// impl Source for StaticSource {
///     fn name(&self) -> &str { "static" }
///     fn description(&self) -> &str { "Fixed in-memory standards" }
///
///     async fn load(&self) -> Result<Vec<Document>> {
///         Ok(self.docs.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync {
    /// Human-readable label, usually the path, URL, or repo.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// `"local"`, `"remote"`, `"git"`, or `"custom"`.
    fn source_type(&self) -> &str {
        "custom"
    }

    /// Load every document this source can currently produce.
    ///
    /// Built-in sources skip failing units and return `Ok(vec![])` when the
    /// whole origin is unreachable. An `Err` is still tolerated by the
    /// aggregator and counts as zero documents.
    async fn load(&self) -> Result<Vec<Document>>;
}

/// Ordered collection of sources.
pub struct SourceRegistry {
    sources: Vec<Box<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Build a registry with one built-in source per configured entry, in
    /// declared order.
    pub fn from_config(config: &Config) -> Result<Self> {
        use crate::config::SourceConfig;
        use crate::source_git::GitSource;
        use crate::source_local::LocalSource;
        use crate::source_remote::RemoteSource;

        let client = crate::http::build_client(&config.http)?;
        let mut registry = Self::new();

        for source in &config.sources {
            match source {
                SourceConfig::Local(cfg) => {
                    registry.register(Box::new(LocalSource::new(cfg.clone())?));
                }
                SourceConfig::Remote(cfg) => {
                    registry.register(Box::new(RemoteSource::new(cfg.clone(), client.clone())));
                }
                SourceConfig::Git(cfg) => {
                    registry.register(Box::new(GitSource::new(
                        cfg.clone(),
                        client.clone(),
                        config.http.concurrency,
                    )));
                }
            }
        }

        Ok(registry)
    }

    pub fn register(&mut self, source: Box<dyn Source>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    pub fn sources_by_type(&self, source_type: &str) -> Vec<&dyn Source> {
        self.sources
            .iter()
            .filter(|s| s.source_type() == source_type)
            .map(|s| s.as_ref())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

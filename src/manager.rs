//! The standards aggregator.
//!
//! [`StandardsManager`] owns the corpus, the TTL cache, and the ordered
//! source registry. Its lifecycle belongs to the caller:
//!
//! ```text
//! new / from_config → initialize() → queries … → refresh() (optional)
//!   Uninitialized  →   Loading   →   Ready
//! ```
//!
//! # Corpus publication
//!
//! A load builds the complete document list off to the side and then swaps
//! one `Arc` under a write lock. Readers clone the `Arc` and never observe a
//! partially built corpus.
//!
//! # Id collisions
//!
//! When several documents resolve to the same id, the one loaded last (later
//! source, or later within a source) wins, and it occupies the position of
//! the first occurrence.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::Config;
use crate::error::NotFound;
use crate::models::{Document, DocumentMeta, SearchResponse};
use crate::search;
use crate::traits::SourceRegistry;

/// Cache key under which the aggregated corpus is stored.
pub const ALL_DOCUMENTS_KEY: &str = "all-documents";

/// Number of suggestions attached to a lookup miss.
const SUGGESTION_LIMIT: usize = 3;

type Corpus = Arc<Vec<Document>>;

/// Lifecycle of a [`StandardsManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

pub struct StandardsManager {
    sources: SourceRegistry,
    cache: TtlCache<Corpus>,
    corpus: RwLock<Corpus>,
    state: Mutex<LoadState>,
}

impl StandardsManager {
    /// Create a manager over `sources` on the system clock.
    pub fn new(sources: SourceRegistry, cache_ttl: Duration) -> Self {
        Self::with_clock(sources, cache_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(sources: SourceRegistry, cache_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sources,
            cache: TtlCache::with_clock(cache_ttl, clock),
            corpus: RwLock::new(Arc::new(Vec::new())),
            state: Mutex::new(LoadState::Uninitialized),
        }
    }

    /// Build the registry from `config.sources` and use
    /// `config.cache_timeout_secs` as the corpus TTL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sources = SourceRegistry::from_config(config)?;
        Ok(Self::new(sources, config.cache_ttl()))
    }

    pub fn state(&self) -> LoadState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: LoadState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Load the corpus once. Later calls are no-ops.
    pub async fn initialize(&self) {
        if self.state() == LoadState::Ready {
            return;
        }
        self.set_state(LoadState::Loading);
        self.load_documents().await;
        self.set_state(LoadState::Ready);
    }

    /// Adopt the cached corpus if it is still live, otherwise load every
    /// source and cache the result.
    pub async fn load_documents(&self) {
        if let Some(cached) = self.cache.get(ALL_DOCUMENTS_KEY) {
            debug!(documents = cached.len(), "corpus served from cache");
            self.publish(cached);
            return;
        }

        // A panicking source is treated like a failing one.
        let results = join_all(
            self.sources
                .sources()
                .iter()
                .map(|s| AssertUnwindSafe(s.load()).catch_unwind()),
        )
        .await;

        let mut loaded = Vec::new();
        for (source, result) in self.sources.sources().iter().zip(results) {
            match result {
                Ok(Ok(docs)) => {
                    info!(
                        source = %source.name(),
                        source_type = %source.source_type(),
                        documents = docs.len(),
                        "source loaded"
                    );
                    loaded.extend(docs);
                }
                Ok(Err(e)) => {
                    warn!(
                        source = %source.name(),
                        error = %e,
                        "source failed to load, contributing no documents"
                    );
                }
                Err(_) => {
                    warn!(
                        source = %source.name(),
                        "source panicked while loading, contributing no documents"
                    );
                }
            }
        }

        let corpus: Corpus = Arc::new(resolve_collisions(loaded));
        info!(documents = corpus.len(), "corpus loaded");
        self.cache.set(ALL_DOCUMENTS_KEY, corpus.clone(), None);
        self.publish(corpus);
    }

    /// Drop everything cached and reload from the sources.
    pub async fn refresh(&self) {
        self.cache.clear();
        self.load_documents().await;
    }

    fn publish(&self, corpus: Corpus) {
        *self.corpus.write().unwrap_or_else(|e| e.into_inner()) = corpus;
    }

    /// Snapshot of the current corpus.
    pub fn corpus(&self) -> Arc<Vec<Document>> {
        self.corpus
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.corpus().len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus().is_empty()
    }

    pub fn get_all_standards(&self) -> Vec<DocumentMeta> {
        self.corpus().iter().map(Document::meta).collect()
    }

    /// Standards whose `category` equals `category` exactly.
    pub fn get_standards_by_category(&self, category: &str) -> Vec<DocumentMeta> {
        self.corpus()
            .iter()
            .filter(|d| d.category == category)
            .map(Document::meta)
            .collect()
    }

    pub fn get_standard_by_id(&self, id: &str) -> Option<Document> {
        self.corpus().iter().find(|d| d.id == id).cloned()
    }

    /// Like [`get_standard_by_id`](Self::get_standard_by_id), but a miss
    /// carries search suggestions built from the id's words.
    pub fn find_standard(&self, id: &str) -> Result<Document, NotFound> {
        let corpus = self.corpus();
        if let Some(doc) = corpus.iter().find(|d| d.id == id) {
            return Ok(doc.clone());
        }

        let query = id.replace(['-', '_'], " ");
        let suggestions = search::search_with_limit(&corpus, &query, SUGGESTION_LIMIT)
            .results
            .into_iter()
            .map(|hit| hit.standard)
            .collect();

        Err(NotFound {
            id: id.to_string(),
            suggestions,
        })
    }

    /// Distinct categories in first-seen order.
    pub fn get_categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.corpus()
            .iter()
            .filter(|d| seen.insert(d.category.clone()))
            .map(|d| d.category.clone())
            .collect()
    }

    pub fn search_standards(&self, query: &str) -> SearchResponse {
        search::search(&self.corpus(), query)
    }
}

/// Deduplicate by id: last document wins, first position is kept.
fn resolve_collisions(docs: Vec<Document>) -> Vec<Document> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(docs.len());
    let mut out: Vec<Document> = Vec::with_capacity(docs.len());

    for doc in docs {
        match index.get(&doc.id) {
            Some(&slot) => {
                debug!(
                    id = %doc.id,
                    replaced = %out[slot].source_path,
                    by = %doc.source_path,
                    "duplicate standard id, later document wins"
                );
                out[slot] = doc;
            }
            None => {
                index.insert(doc.id.clone(), out.len());
                out.push(doc);
            }
        }
    }

    out
}

//! Aggregator integration tests: local directories on disk plus in-memory
//! sources for counting loads and injecting failures.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Map;
use tempfile::TempDir;

use standards_hub::cache::ManualClock;
use standards_hub::config::parse_config;
use standards_hub::manager::{LoadState, StandardsManager};
use standards_hub::models::{Document, Origin};
use standards_hub::traits::{Source, SourceRegistry};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn doc(id: &str, title: &str, category: &str, tags: &[&str]) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        category: category.to_string(),
        subcategory: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        version: None,
        last_updated: None,
        origin: Origin::Local,
        source_path: format!("{}.md", id),
        content: format!("# {}\n\nbody", title),
        front_matter: Map::new(),
    }
}

struct CountingSource {
    label: &'static str,
    docs: Vec<Document>,
    loads: Arc<AtomicUsize>,
}

#[async_trait]
impl Source for CountingSource {
    fn name(&self) -> &str {
        self.label
    }

    fn description(&self) -> &str {
        "Fixed documents with a load counter"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.docs.clone())
    }
}

struct FailingSource;

#[async_trait]
impl Source for FailingSource {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        Err(anyhow!("connection refused"))
    }
}

struct PanickingSource;

#[async_trait]
impl Source for PanickingSource {
    fn name(&self) -> &str {
        "panicky"
    }

    fn description(&self) -> &str {
        "Panics while loading"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        panic!("index out of bounds in custom source")
    }
}

fn counting(label: &'static str, docs: Vec<Document>) -> (Box<dyn Source>, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        label,
        docs,
        loads: loads.clone(),
    };
    (Box::new(source), loads)
}

fn local_manager(tmp: &TempDir) -> StandardsManager {
    let config = parse_config(&format!(
        "[[sources]]\ntype = \"local\"\npath = \"{}\"\n",
        tmp.path().display()
    ))
    .unwrap();
    StandardsManager::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_local_directory_end_to_end() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "frontend/vue/components.md",
        "---\ntitle: Vue 3 组件开发规范\ntags: [vue, vue3, component]\n---\n# Heading\n\nUse script setup.\n",
    );
    write(
        tmp.path(),
        "backend/api/restful.md",
        "---\ntitle: RESTful API 设计规范\ntags:\n  - api\n  - restful\n  - http\n---\nResources are nouns.\n",
    );
    write(tmp.path(), "README.md", "# Index\n\nTop level notes.\n");
    write(tmp.path(), "node_modules/pkg/readme.md", "# Vendored\n\nignored\n");
    write(tmp.path(), ".hidden/secret.md", "# Hidden\n\nignored\n");

    let manager = local_manager(&tmp);
    manager.initialize().await;
    assert_eq!(manager.state(), LoadState::Ready);
    assert_eq!(manager.len(), 3);

    let vue = manager.get_standard_by_id("frontend-vue-components").unwrap();
    assert_eq!(vue.title, "Vue 3 组件开发规范");
    assert_eq!(vue.category, "frontend");
    assert_eq!(vue.subcategory.as_deref(), Some("vue"));
    assert_eq!(vue.tags, vec!["vue", "vue3", "component"]);
    assert_eq!(vue.description.as_deref(), Some("Use script setup."));

    let readme = manager.get_standard_by_id("readme").unwrap();
    assert_eq!(readme.category, "custom");
    assert_eq!(readme.title, "Index");

    let found = manager.search_standards("vue");
    assert_eq!(found.total, 1);
    assert_eq!(found.results[0].standard.id, "frontend-vue-components");

    let none = manager.search_standards("nonexistent");
    assert_eq!(none.total, 0);
    assert!(none.results.is_empty());

    let restful = manager.search_standards("restful");
    assert_eq!(restful.results[0].standard.id, "backend-api-restful");
}

#[tokio::test]
async fn test_initialize_is_idempotent_and_refresh_reloads() {
    let (source, loads) = counting("one", vec![doc("a", "A", "custom", &[])]);
    let mut registry = SourceRegistry::new();
    registry.register(source);
    let manager = StandardsManager::new(registry, Duration::from_secs(60));

    manager.initialize().await;
    manager.initialize().await;
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    manager.refresh().await;
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_cached_corpus_served_until_expiry() {
    let (source, loads) = counting("one", vec![doc("a", "A", "custom", &[])]);
    let mut registry = SourceRegistry::new();
    registry.register(source);
    let clock = Arc::new(ManualClock::new());
    let manager = StandardsManager::with_clock(registry, Duration::from_secs(10), clock.clone());

    manager.initialize().await;
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(10));
    manager.load_documents().await;
    assert_eq!(loads.load(Ordering::SeqCst), 1, "still live at the boundary");

    clock.advance(Duration::from_millis(1));
    manager.load_documents().await;
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failing_source_does_not_block_others() {
    let (first, _) = counting("first", vec![doc("a", "A", "alpha", &[])]);
    let (third, _) = counting("third", vec![doc("c", "C", "gamma", &[])]);
    let mut registry = SourceRegistry::new();
    registry.register(first);
    registry.register(Box::new(FailingSource));
    registry.register(third);
    let manager = StandardsManager::new(registry, Duration::from_secs(60));

    manager.initialize().await;
    assert_eq!(manager.state(), LoadState::Ready);
    let ids: Vec<String> = manager
        .get_all_standards()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[tokio::test]
async fn test_category_filter_is_exact_and_categories_first_seen() {
    let mut nested = doc("nested", "Nested", "backend", &[]);
    nested.subcategory = Some("frontend".to_string());
    let docs = vec![
        doc("one", "One", "frontend", &[]),
        nested,
        doc("two", "Two", "frontend", &[]),
        doc("three", "Three", "Frontend", &[]),
    ];
    let (source, _) = counting("one", docs);
    let mut registry = SourceRegistry::new();
    registry.register(source);
    let manager = StandardsManager::new(registry, Duration::from_secs(60));
    manager.initialize().await;

    let ids: Vec<String> = manager
        .get_standards_by_category("frontend")
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["one", "two"]);
    assert!(manager.get_standards_by_category("missing").is_empty());
    assert_eq!(
        manager.get_categories(),
        vec!["frontend", "backend", "Frontend"]
    );
}

#[tokio::test]
async fn test_id_collision_across_sources() {
    let (first, _) = counting(
        "first",
        vec![doc("shared", "From first", "x", &[]), doc("only-first", "F", "x", &[])],
    );
    let (second, _) = counting("second", vec![doc("shared", "From second", "y", &[])]);
    let mut registry = SourceRegistry::new();
    registry.register(first);
    registry.register(second);
    let manager = StandardsManager::new(registry, Duration::from_secs(60));
    manager.initialize().await;

    assert_eq!(manager.len(), 2);
    let all = manager.get_all_standards();
    assert_eq!(all[0].id, "shared");
    assert_eq!(all[0].title, "From second");
    assert_eq!(all[1].id, "only-first");
}

#[tokio::test]
async fn test_find_standard_suggests_on_miss() {
    let docs = vec![
        doc("frontend-vue-components", "Vue 3 组件开发规范", "frontend", &["vue", "component"]),
        doc("backend-api-restful", "RESTful API 设计规范", "backend", &["api", "restful"]),
    ];
    let (source, _) = counting("one", docs);
    let mut registry = SourceRegistry::new();
    registry.register(source);
    let manager = StandardsManager::new(registry, Duration::from_secs(60));
    manager.initialize().await;

    assert!(manager.find_standard("backend-api-restful").is_ok());

    let missing = manager.find_standard("vue-component").unwrap_err();
    assert_eq!(missing.id, "vue-component");
    assert_eq!(missing.suggestions.len(), 1);
    assert_eq!(missing.suggestions[0].id, "frontend-vue-components");
    assert_eq!(missing.to_string(), "standard not found: vue-component");

    assert!(manager.get_standard_by_id("vue-component").is_none());
}

#[tokio::test]
async fn test_queries_before_initialize_are_empty() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.md", "# A\n\nbody\n");
    let manager = local_manager(&tmp);

    assert_eq!(manager.state(), LoadState::Uninitialized);
    assert!(manager.get_all_standards().is_empty());
    assert_eq!(manager.search_standards("a").total, 0);

    manager.initialize().await;
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_panicking_source_counts_as_failure() {
    let (first, _) = counting("first", vec![doc("a", "A", "alpha", &[])]);
    let (third, _) = counting("third", vec![doc("c", "C", "gamma", &[])]);
    let mut registry = SourceRegistry::new();
    registry.register(first);
    registry.register(Box::new(PanickingSource));
    registry.register(third);
    let manager = StandardsManager::new(registry, Duration::from_secs(60));

    manager.initialize().await;
    assert_eq!(manager.state(), LoadState::Ready);
    assert_eq!(manager.len(), 2);
    assert!(manager.get_standard_by_id("c").is_some());
}

#[tokio::test]
async fn test_unrepresentable_ttl_does_not_panic() {
    let (source, loads) = counting("one", vec![doc("a", "A", "custom", &[])]);
    let mut registry = SourceRegistry::new();
    registry.register(source);
    let manager = StandardsManager::new(registry, Duration::from_secs(i64::MAX as u64));

    manager.initialize().await;
    manager.load_documents().await;
    assert_eq!(manager.len(), 1);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

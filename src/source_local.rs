//! Local directory source.
//!
//! Walks a directory tree in file-name order, skipping hidden directories,
//! dependency directories, and any configured exclude globs, and normalizes
//! every markdown file it finds. Paths handed to the normalizer are relative
//! to the configured root and `/`-separated on every platform.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::LocalSourceConfig;
use crate::error::SourceError;
use crate::markdown::{is_markdown_path, normalize};
use crate::models::{Document, Origin};
use crate::traits::Source;

const DEPENDENCY_DIRS: &[&str] = &["node_modules", "target"];

pub struct LocalSource {
    name: String,
    root: PathBuf,
    excludes: GlobSet,
}

impl LocalSource {
    pub fn new(config: LocalSourceConfig) -> Result<Self> {
        let excludes = build_globset(&config.exclude_globs)?;
        Ok(Self {
            name: config.path.display().to_string(),
            root: config.path,
            excludes,
        })
    }
}

#[async_trait]
impl Source for LocalSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Markdown files in a local directory"
    }

    fn source_type(&self) -> &str {
        "local"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        let root = self.root.clone();
        let excludes = self.excludes.clone();
        match tokio::task::spawn_blocking(move || scan_local(&root, &excludes)).await {
            Ok(docs) => Ok(docs),
            Err(e) => {
                warn!(source = %self.name, error = %e, "local scan task failed");
                Ok(Vec::new())
            }
        }
    }
}

/// Scan `root` and return its documents in walk order.
///
/// A missing root yields an empty list. Unreadable files and files with no
/// body are skipped.
pub fn scan_local(root: &Path, excludes: &GlobSet) -> Vec<Document> {
    if !root.is_dir() {
        warn!(root = %root.display(), "local source root does not exist");
        return Vec::new();
    }

    let mut docs = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let rel_str = relative_path(root, path);

        if excludes.is_match(&rel_str) || !is_markdown_path(&rel_str) {
            continue;
        }

        match file_to_document(path, &rel_str) {
            Ok(Some(doc)) => docs.push(doc),
            Ok(None) => debug!(path = %rel_str, "skipping markdown file with empty body"),
            Err(e) => warn!(path = %rel_str, error = %e, "skipping unreadable file"),
        }
    }

    docs
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || DEPENDENCY_DIRS.iter().any(|d| name == *d)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_to_document(path: &Path, relative_path: &str) -> Result<Option<Document>, SourceError> {
    let raw = std::fs::read_to_string(path)?;
    let Some(mut doc) = normalize(&raw, relative_path, Origin::Local) else {
        return Ok(None);
    };

    if doc.last_updated.is_none() {
        doc.last_updated = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
    }

    Ok(Some(doc))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn no_excludes() -> GlobSet {
        build_globset(&[]).unwrap()
    }

    #[test]
    fn test_scan_follows_path_convention() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "frontend/vue/components.md", "# Vue Components\n\nBody.");
        write(tmp.path(), "backend/api.markdown", "# API\n\nBody.");
        write(tmp.path(), "notes.txt", "not markdown");

        let docs = scan_local(tmp.path(), &no_excludes());
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["backend-api", "frontend-vue-components"]);
        assert!(docs.iter().all(|d| d.origin == Origin::Local));
        assert_eq!(docs[1].source_path, "frontend/vue/components.md");
        assert!(docs[1].last_updated.is_some(), "mtime fallback");
    }

    #[test]
    fn test_skips_hidden_and_dependency_dirs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".git/notes.md", "# Hidden");
        write(tmp.path(), "node_modules/pkg/README.md", "# Dep");
        write(tmp.path(), "target/doc.md", "# Build");
        write(tmp.path(), "guides/style.md", "# Style");

        let docs = scan_local(tmp.path(), &no_excludes());
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "guides-style");
    }

    #[test]
    fn test_exclude_globs_and_empty_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "drafts/wip.md", "# WIP");
        write(tmp.path(), "guides/empty.md", "   \n");
        write(tmp.path(), "guides/real.md", "# Real");

        let excludes = build_globset(&["drafts/**".to_string()]).unwrap();
        let docs = scan_local(tmp.path(), &excludes);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "guides-real");
    }

    #[test]
    fn test_missing_root_is_empty() {
        let docs = scan_local(Path::new("/definitely/not/here"), &no_excludes());
        assert!(docs.is_empty());
    }

    #[test]
    fn test_front_matter_last_updated_kept() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "ops/deploy.md",
            "---\nlastUpdated: 2024-03-01\n---\n# Deploy",
        );
        let docs = scan_local(tmp.path(), &no_excludes());
        assert_eq!(docs[0].last_updated.as_deref(), Some("2024-03-01"));
    }

    #[tokio::test]
    async fn test_load_via_trait() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "standards/testing/unit.md", "# Unit Tests");

        let source = LocalSource::new(LocalSourceConfig {
            path: tmp.path().to_path_buf(),
            exclude_globs: Vec::new(),
        })
        .unwrap();
        let docs = source.load().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "testing-unit");
        assert_eq!(docs[0].category, "testing");
    }
}

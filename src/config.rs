//! TOML configuration.
//!
//! ```toml
//! cache_timeout_secs = 3600
//!
//! [http]
//! timeout_secs = 30
//! concurrency = 8
//!
//! [[sources]]
//! type = "local"
//! path = "./standards"
//!
//! [[sources]]
//! type = "remote"
//! url = "https://docs.example.com/api/standards"
//! headers = { Authorization = "Bearer abc" }
//!
//! [[sources]]
//! type = "git"
//! repo = "acme/engineering-standards"
//! branch = "main"
//! path = "standards"
//! ```
//!
//! [`load_config`] parses and validates once; the rest of the crate trusts
//! the resulting [`Config`].

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_cache_timeout_secs")]
    pub cache_timeout_secs: u64,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_timeout_secs: default_cache_timeout_secs(),
            http: HttpConfig::default(),
            sources: Vec::new(),
        }
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }
}

fn default_cache_timeout_secs() -> u64 {
    3600
}

/// Upper bound for `cache_timeout_secs`: one year.
pub const MAX_CACHE_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum in-flight blob fetches per git source.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_concurrency() -> usize {
    8
}

/// How to reach one origin.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Local(LocalSourceConfig),
    Remote(RemoteSourceConfig),
    Git(GitSourceConfig),
}

impl SourceConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            SourceConfig::Local(_) => "local",
            SourceConfig::Remote(_) => "remote",
            SourceConfig::Git(_) => "git",
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LocalSourceConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RemoteSourceConfig {
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Explicit list of raw markdown URLs. Takes priority over `url`.
    ///
    /// Ids and categories come from the URL path starting at its
    /// `standards/` directory, or from the whole path when there is none:
    /// `.../main/standards/frontend/vue.md` gives `frontend-vue`, while
    /// `.../acme/std/main/frontend/vue.md` gives `acme-std-main-frontend-vue`.
    #[serde(default)]
    pub docs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GitSourceConfig {
    /// `owner/name`.
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Only blobs under this prefix are loaded.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_branch() -> String {
    "main".to_string()
}

pub const GITHUB_API_BASE: &str = "https://api.github.com";

fn default_api_base() -> String {
    GITHUB_API_BASE.to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;

    // Relative local paths resolve against the config file's directory.
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for source in &mut config.sources {
        if let SourceConfig::Local(local) = source {
            if local.path.is_relative() {
                local.path = base.join(&local.path);
            }
        }
    }

    Ok(config)
}

/// Parse and validate a TOML config string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.cache_timeout_secs == 0 {
        bail!("cache_timeout_secs must be > 0");
    }
    if config.cache_timeout_secs > MAX_CACHE_TIMEOUT_SECS {
        bail!(
            "cache_timeout_secs must be <= {} (one year), got {}",
            MAX_CACHE_TIMEOUT_SECS,
            config.cache_timeout_secs
        );
    }
    if config.http.timeout_secs == 0 {
        bail!("http.timeout_secs must be > 0");
    }
    if config.http.concurrency == 0 {
        bail!("http.concurrency must be > 0");
    }

    for (i, source) in config.sources.iter().enumerate() {
        match source {
            SourceConfig::Local(local) => {
                if local.path.as_os_str().is_empty() {
                    bail!("sources[{}]: local path must not be empty", i);
                }
                for pattern in &local.exclude_globs {
                    globset::Glob::new(pattern).with_context(|| {
                        format!("sources[{}]: invalid exclude glob '{}'", i, pattern)
                    })?;
                }
            }
            SourceConfig::Remote(remote) => {
                url::Url::parse(&remote.url)
                    .with_context(|| format!("sources[{}]: invalid url '{}'", i, remote.url))?;
                for doc in &remote.docs {
                    url::Url::parse(doc)
                        .with_context(|| format!("sources[{}]: invalid doc url '{}'", i, doc))?;
                }
            }
            SourceConfig::Git(git) => {
                let parts: Vec<&str> = git.repo.split('/').collect();
                if parts.len() != 2 || parts.iter().any(|p| p.trim().is_empty()) {
                    bail!(
                        "sources[{}]: git repo must be 'owner/name', got '{}'",
                        i,
                        git.repo
                    );
                }
                if git.branch.trim().is_empty() {
                    bail!("sources[{}]: git branch must not be empty", i);
                }
                url::Url::parse(&git.api_base).with_context(|| {
                    format!("sources[{}]: invalid api_base '{}'", i, git.api_base)
                })?;
            }
        }
    }

    Ok(())
}

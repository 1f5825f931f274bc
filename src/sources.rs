use serde::Serialize;

use crate::config::{Config, SourceConfig};

/// Configuration-level view of one source, for `standards sources`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub source_type: String,
    pub target: String,
    pub status: String,
    pub healthy: bool,
}

/// Describe every configured source without performing network I/O.
///
/// Local sources are checked for an existing root; remote and git sources
/// are reported as configured.
pub fn get_sources(config: &Config) -> Vec<SourceStatus> {
    config
        .sources
        .iter()
        .map(|source| match source {
            SourceConfig::Local(local) => {
                let exists = local.path.is_dir();
                SourceStatus {
                    source_type: "local".to_string(),
                    target: local.path.display().to_string(),
                    status: if exists {
                        "OK".to_string()
                    } else {
                        "MISSING (root does not exist)".to_string()
                    },
                    healthy: exists,
                }
            }
            SourceConfig::Remote(remote) => {
                let target = if remote.docs.is_empty() {
                    remote.url.clone()
                } else {
                    format!("{} ({} docs)", remote.url, remote.docs.len())
                };
                SourceStatus {
                    source_type: "remote".to_string(),
                    target,
                    status: "CONFIGURED".to_string(),
                    healthy: true,
                }
            }
            SourceConfig::Git(git) => {
                let mut target = format!("{}@{}", git.repo, git.branch);
                if let Some(path) = &git.path {
                    target.push(':');
                    target.push_str(path);
                }
                SourceStatus {
                    source_type: "git".to_string(),
                    target,
                    status: "CONFIGURED".to_string(),
                    healthy: true,
                }
            }
        })
        .collect()
}

pub fn list_sources(config: &Config) {
    let statuses = get_sources(config);
    if statuses.is_empty() {
        println!("No sources configured.");
        return;
    }

    println!("{:<8} {:<32} {:<8} TARGET", "TYPE", "STATUS", "HEALTHY");
    for s in &statuses {
        println!(
            "{:<8} {:<32} {:<8} {}",
            s.source_type, s.status, s.healthy, s.target
        );
    }
}

//! Error types for Standards Hub.
//!
//! [`SourceError`] covers everything a source adapter can hit while loading.
//! Adapters log and swallow these at their boundary, so they never reach a
//! caller of the aggregator. [`NotFound`] is the value returned by an id
//! lookup miss.

use crate::models::DocumentMeta;

/// Failure while loading from one source or one unit within it.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The whole origin is unreachable or returned a non-success status.
    #[error("source unavailable ({target}): {reason}")]
    Unavailable { target: String, reason: String },

    /// One unit (file, record, blob) could not be turned into a document.
    #[error("malformed content in {unit}: {reason}")]
    Malformed { unit: String, reason: String },

    /// Transport-level HTTP failure, including timeouts.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn unavailable(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            unit: unit.into(),
            reason: reason.into(),
        }
    }
}

/// Lookup miss for a standard id, with best-effort suggestions.
#[derive(Debug, Clone, thiserror::Error)]
#[error("standard not found: {id}")]
pub struct NotFound {
    pub id: String,
    pub suggestions: Vec<DocumentMeta>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SourceError::unavailable("https://example.com/api", "HTTP 503");
        assert_eq!(
            err.to_string(),
            "source unavailable (https://example.com/api): HTTP 503"
        );

        let err = SourceError::malformed("frontend/vue.md", "empty body");
        assert!(err.to_string().contains("frontend/vue.md"));

        let err = NotFound {
            id: "missing".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(err.to_string(), "standard not found: missing");
    }
}

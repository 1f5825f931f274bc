//! Markdown normalization.
//!
//! Turns raw markdown text, a logical path, and an [`Origin`] into a
//! [`Document`]. Every field has a front matter override and a fallback
//! derived from either the path or the body, so normalization never fails
//! except when there is no body at all.
//!
//! # Path convention
//!
//! ```text
//! standards/frontend/vue/components.md
//!           └──┬───┘ └┬┘ └───┬────┘
//!          category  sub     name      → id "frontend-vue-components"
//! ```

use serde_json::{Map, Value};

use crate::frontmatter::{self, scalar_string};
use crate::models::{Document, Origin, DEFAULT_CATEGORY};

/// File extensions treated as markdown by every source.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

const DESCRIPTION_MAX_CHARS: usize = 200;

/// Returns `true` if `path` ends with a markdown extension (case-insensitive).
pub fn is_markdown_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    MARKDOWN_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Normalize raw markdown into a [`Document`].
///
/// Returns `None` when the body (after removing front matter) is empty or
/// whitespace-only.
pub fn normalize(raw: &str, logical_path: &str, origin: Origin) -> Option<Document> {
    let split = frontmatter::split(raw);
    let content = split.body.trim();
    if content.is_empty() {
        return None;
    }
    let fm = split.data;

    let id = fm_string(&fm, "id").unwrap_or_else(|| derive_id(logical_path));

    let title = fm_string(&fm, "title")
        .or_else(|| first_heading(content))
        .unwrap_or_else(|| file_stem(logical_path));

    let description = fm_string(&fm, "description").or_else(|| first_paragraph_line(content));

    let (path_category, path_subcategory) = derive_category(logical_path);
    let category = fm_string(&fm, "category").unwrap_or(path_category);
    let subcategory = fm_string(&fm, "subcategory").or(path_subcategory);

    let tags = fm.get("tags").map(parse_tags).unwrap_or_default();

    let version = fm_string(&fm, "version");
    let last_updated = fm_string(&fm, "lastUpdated").or_else(|| fm_string(&fm, "last_updated"));

    Some(Document {
        id,
        title,
        description,
        category,
        subcategory,
        tags,
        version,
        last_updated,
        origin,
        source_path: logical_path.to_string(),
        content: content.to_string(),
        front_matter: fm,
    })
}

fn fm_string(fm: &Map<String, Value>, key: &str) -> Option<String> {
    fm.get(key).and_then(scalar_string)
}

/// Path segments with `./`, a leading `standards` segment, and empty parts
/// removed.
fn path_segments(logical_path: &str) -> Vec<&str> {
    let path = logical_path.strip_prefix("./").unwrap_or(logical_path);
    let mut segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if segments.len() > 1 && segments[0] == "standards" {
        segments.remove(0);
    }
    segments
}

fn strip_markdown_extension(name: &str) -> &str {
    for ext in MARKDOWN_EXTENSIONS {
        let suffix_len = ext.len() + 1;
        if name.len() > suffix_len {
            let (stem, suffix) = name.split_at(name.len() - suffix_len);
            if suffix.eq_ignore_ascii_case(&format!(".{}", ext)) {
                return stem;
            }
        }
    }
    name
}

/// Derive a document id from its logical path.
///
/// `standards/frontend/vue/components.md` → `frontend-vue-components`.
pub fn derive_id(logical_path: &str) -> String {
    let segments = path_segments(logical_path);
    let joined = segments.join("-");
    strip_markdown_extension(&joined).to_lowercase()
}

/// Derive `(category, subcategory)` from the logical path.
pub fn derive_category(logical_path: &str) -> (String, Option<String>) {
    let segments = path_segments(logical_path);
    let category = if segments.len() > 1 {
        segments[0].to_string()
    } else {
        DEFAULT_CATEGORY.to_string()
    };
    let subcategory = if segments.len() > 2 {
        Some(segments[1].to_string())
    } else {
        None
    };
    (category, subcategory)
}

fn file_stem(logical_path: &str) -> String {
    let name = logical_path
        .rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(logical_path);
    strip_markdown_extension(name).to_string()
}

fn first_heading(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let title = line.trim_start().strip_prefix("# ")?.trim();
        if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        }
    })
}

fn is_list_item(line: &str) -> bool {
    if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("+ ") {
        return true;
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn first_paragraph_line(content: &str) -> Option<String> {
    let line = content.lines().map(str::trim).find(|line| {
        !line.is_empty() && !line.starts_with('#') && !line.starts_with("```") && !is_list_item(line)
    })?;

    if line.chars().count() > DESCRIPTION_MAX_CHARS {
        let truncated: String = line.chars().take(DESCRIPTION_MAX_CHARS).collect();
        Some(format!("{}...", truncated))
    } else {
        Some(line.to_string())
    }
}

fn parse_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_string)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

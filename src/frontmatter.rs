//! Front matter splitting and parsing.
//!
//! A front matter block is a `---` line at the very top of a markdown file,
//! followed by `key: value` lines and a closing `---` line. Only the flat
//! subset of YAML that documentation headers use is understood: scalars,
//! quoted strings, inline `[a, b]` arrays, and indented `- item` block lists.
//! Parsing is total; anything unrecognised is skipped.

use serde_json::{Map, Value};

const DELIMITER: &str = "---";

/// Result of splitting raw markdown into header and body.
#[derive(Debug, Clone, Default)]
pub struct Split<'a> {
    pub data: Map<String, Value>,
    pub body: &'a str,
}

/// Returns `true` if `text` opens with a front matter delimiter line,
/// ignoring a BOM and leading blank lines. A `---` rule further down the
/// body does not count.
pub fn has_front_matter(text: &str) -> bool {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    strip_delimiter_line(text.trim_start_matches(['\n', '\r'])).is_some()
}

/// Split an optional leading front matter block from `raw`.
///
/// An unterminated block is treated as plain body text.
pub fn split(raw: &str) -> Split<'_> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let trimmed = text.trim_start_matches(['\n', '\r']);

    let Some(after_open) = strip_delimiter_line(trimmed) else {
        return Split {
            data: Map::new(),
            body: text,
        };
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Split {
                data: parse_block(header),
                body,
            };
        }
        offset += line.len();
    }

    Split {
        data: Map::new(),
        body: text,
    }
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let (first, rest) = match text.find('\n') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    };
    if first.trim_end() == DELIMITER {
        Some(rest)
    } else {
        None
    }
}

fn parse_block(header: &str) -> Map<String, Value> {
    let mut data = Map::new();
    let mut pending_list: Option<(String, Vec<Value>)> = None;

    for line in header.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ").or_else(|| {
            if trimmed == "-" {
                Some("")
            } else {
                None
            }
        }) {
            if let Some((_, items)) = pending_list.as_mut() {
                if !item.trim().is_empty() {
                    items.push(parse_scalar(item.trim()));
                }
            }
            continue;
        }

        if let Some((key, items)) = pending_list.take() {
            data.insert(key, Value::Array(items));
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim().to_string();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();

        if value.is_empty() {
            pending_list = Some((key, Vec::new()));
        } else {
            data.insert(key, parse_value(value));
        }
    }

    if let Some((key, items)) = pending_list.take() {
        let value = if items.is_empty() {
            Value::Null
        } else {
            Value::Array(items)
        };
        data.insert(key, value);
    }

    data
}

fn parse_value(value: &str) -> Value {
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_scalar)
            .collect();
        return Value::Array(items);
    }
    parse_scalar(value)
}

fn parse_scalar(value: &str) -> Value {
    if let Some(s) = unquote(value) {
        return Value::String(s.to_string());
    }
    match value {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" | "~" => return Value::Null,
        _ => {}
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::from(n);
    }
    if value.contains('.') {
        if let Ok(f) = value.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(value.to_string())
}

fn unquote(value: &str) -> Option<&str> {
    if value.len() < 2 {
        return None;
    }
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
}

/// Render a scalar front matter value as a string.
///
/// Strings are returned as-is, numbers and booleans are formatted. Arrays,
/// objects, null, and blank strings yield `None`.
pub fn scalar_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

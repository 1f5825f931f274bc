//! Keyword relevance search over the in-memory corpus.
//!
//! A deterministic linear scan, no index. Each whitespace-separated query
//! term adds weight for every field it appears in:
//!
//! | Field | Weight |
//! |-------|--------|
//! | title | 10 |
//! | description | 5 |
//! | each matching tag | 7 |
//! | category | 3 |
//! | content | 1 |
//!
//! All comparisons are case-insensitive substring matches. Documents with
//! zero relevance are dropped; the rest are sorted by relevance with a
//! stable sort, so equal scores keep corpus order.

use crate::models::{Document, SearchHit, SearchResponse};

/// Number of hits returned by [`search`].
pub const DEFAULT_RESULT_LIMIT: usize = 10;

const TITLE_WEIGHT: u32 = 10;
const DESCRIPTION_WEIGHT: u32 = 5;
const TAG_WEIGHT: u32 = 7;
const CATEGORY_WEIGHT: u32 = 3;
const CONTENT_WEIGHT: u32 = 1;

/// Lowercased, non-empty query terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Relevance of one document for pre-lowercased `terms`.
pub fn score_document(doc: &Document, terms: &[String]) -> u32 {
    if terms.is_empty() {
        return 0;
    }

    let title = doc.title.to_lowercase();
    let description = doc
        .description
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let tags: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();
    let category = doc.category.to_lowercase();
    let content = doc.content.to_lowercase();

    let mut score = 0;
    for term in terms {
        let term = term.as_str();
        if title.contains(term) {
            score += TITLE_WEIGHT;
        }
        if description.contains(term) {
            score += DESCRIPTION_WEIGHT;
        }
        score += TAG_WEIGHT * tags.iter().filter(|t| t.contains(term)).count() as u32;
        if category.contains(term) {
            score += CATEGORY_WEIGHT;
        }
        if content.contains(term) {
            score += CONTENT_WEIGHT;
        }
    }
    score
}

/// Rank `corpus` against `query`, keeping the top [`DEFAULT_RESULT_LIMIT`].
pub fn search(corpus: &[Document], query: &str) -> SearchResponse {
    search_with_limit(corpus, query, DEFAULT_RESULT_LIMIT)
}

/// Rank `corpus` against `query`, keeping the top `limit` hits.
///
/// `total` in the response is the number of matching documents before
/// truncation.
pub fn search_with_limit(corpus: &[Document], query: &str, limit: usize) -> SearchResponse {
    let terms = query_terms(query);
    if terms.is_empty() {
        return SearchResponse::empty(query);
    }

    let mut scored: Vec<(u32, &Document)> = corpus
        .iter()
        .map(|doc| (score_document(doc, &terms), doc))
        .filter(|(score, _)| *score > 0)
        .collect();

    // Stable: ties keep corpus order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let total = scored.len();
    let results = scored
        .into_iter()
        .take(limit)
        .map(|(relevance, doc)| SearchHit {
            standard: doc.meta(),
            relevance,
        })
        .collect();

    SearchResponse {
        query: query.to_string(),
        total,
        results,
    }
}

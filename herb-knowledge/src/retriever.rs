//! Lexical retrieval over the corpus.
//!
//! Scoring is plain token overlap: the number of shared lowercase tokens
//! divided by the size of the larger token set. Each document gets
//! `overlap(query, content) + METADATA_WEIGHT * overlap(query, metadata_json)`.
//! Documents scoring zero are dropped and ties keep corpus order.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::{Document, RetrievalResult};

/// Metadata matches count this much more than content matches.
pub const METADATA_WEIGHT: f64 = 1.5;

/// Candidate pool size for [`Retriever::retrieve_by_category`].
pub const CATEGORY_CANDIDATES: usize = 10;

// Word characters are ASCII only; any other letter is treated like punctuation.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_\s]").expect("static pattern compiles"));

/// Lower-cases, blanks out everything but ASCII word characters, splits on
/// whitespace and drops tokens of two characters or fewer.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .map(str::to_owned)
        .collect()
}

/// `|A ∩ B| / max(|A|, |B|)` over the token sets; `0.0` when either is empty.
pub fn token_overlap(a: &[String], b: &[String]) -> f64 {
    let sa: HashSet<&str> = a.iter().map(String::as_str).collect();
    let sb: HashSet<&str> = b.iter().map(String::as_str).collect();
    let larger = sa.len().max(sb.len());
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let shared = sa.intersection(&sb).count();
    shared as f64 / larger as f64
}

/// Read-only view over a loaded corpus.
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'a> {
    documents: &'a [Document],
}

impl<'a> Retriever<'a> {
    pub fn new(documents: &'a [Document]) -> Self {
        Self { documents }
    }

    /// Combined content and metadata score of one document.
    pub fn score_document(query_tokens: &[String], doc: &Document) -> f64 {
        let content = token_overlap(query_tokens, &tokenize(&doc.content));
        let metadata_text = serde_json::to_string(&doc.metadata).unwrap_or_default();
        let metadata = token_overlap(query_tokens, &tokenize(&metadata_text)) * METADATA_WEIGHT;
        content + metadata
    }

    /// Top `k` documents by combined score, highest first.
    pub fn similarity_search(&self, query: &str, k: usize) -> Vec<RetrievalResult> {
        let query_tokens = tokenize(query);

        let mut results: Vec<RetrievalResult> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let score = Self::score_document(&query_tokens, doc);
                (score > 0.0).then(|| RetrievalResult {
                    document: doc.clone(),
                    score,
                })
            })
            .collect();

        // `sort_by` is stable, so equal scores keep corpus order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        debug!(
            query_tokens = query_tokens.len(),
            hits = results.len(),
            k,
            "similarity search"
        );
        results
    }

    /// Searches a wider candidate pool, keeps documents whose `category`,
    /// `symptoms` or `herbs` equals one of `categories`, then truncates to `k`.
    pub fn retrieve_by_category(
        &self,
        query: &str,
        categories: &[&str],
        k: usize,
    ) -> Vec<RetrievalResult> {
        let mut results: Vec<RetrievalResult> = self
            .similarity_search(query, CATEGORY_CANDIDATES.max(k))
            .into_iter()
            .filter(|r| r.document.metadata.matches_any(categories))
            .collect();
        results.truncate(k);
        results
    }
}

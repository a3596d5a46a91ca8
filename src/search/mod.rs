//! Content search over normalized document text.
//!
//! This module provides normalization, stop-word filtering, query parsing,
//! the in-memory index, the three match finders and result ranking. It is
//! synchronous; debouncing and batch loading live in [`crate::searcher`].

// Module declarations
pub(crate) mod index;
pub(crate) mod mark;
pub(crate) mod matcher;
pub(crate) mod normalize;
pub(crate) mod query;
pub(crate) mod ranking;
pub(crate) mod stopwords;

// Public re-exports (used via lib.rs)
pub use index::{IndexStats, IndexedDocument, SearchIndex};
pub use mark::{HIGHLIGHT_CLASS, MarkSpan, MarkStyle, PALETTE_SIZE, TermMarker, escape_html};
pub use matcher::{Match, Matcher, estimate_line};
pub use normalize::normalize;
pub use query::{Query, SearchType};
pub use ranking::rank;
pub use stopwords::{filter_stop_words, is_stop_word};

use crate::config::SearchConfig;
use serde::Serialize;

/// All matches for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub path: String,
    pub name: String,
    pub matches: Vec<Match>,
    pub match_count: usize,
    pub search_type: SearchType,
}

/// Runs a query against every indexed document and ranks the results.
///
/// Queries shorter than `min_search_length` characters, and queries that
/// filter down to no terms, return an empty list.
pub fn search(index: &SearchIndex, raw_query: &str, config: &SearchConfig) -> Vec<SearchResult> {
    if raw_query.trim().chars().count() < config.min_search_length {
        return vec![];
    }

    let query = Query::parse(raw_query);
    let Some(matcher) = Matcher::new(&query, config) else {
        tracing::debug!("Query '{}' has no searchable terms", raw_query);
        return vec![];
    };

    let start = std::time::Instant::now();
    let results: Vec<SearchResult> = index
        .iter()
        .filter_map(|document| {
            let matches = matcher.find(document);
            (!matches.is_empty()).then(|| SearchResult {
                path: document.path.clone(),
                name: document.name.clone(),
                match_count: matches.len(),
                matches,
                search_type: matcher.search_type(),
            })
        })
        .collect();

    let ranked = rank(results, config.max_results);
    tracing::debug!(
        "Search '{}' ({}) matched {} document(s) in {:?}",
        raw_query,
        matcher.search_type(),
        ranked.len(),
        start.elapsed()
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_short_query_skips_index() {
        let mut index = SearchIndex::new();
        index.index_document("a.md", "a.md", "x marks the spot");
        check!(search(&index, "x", &SearchConfig::default()).is_empty());
        check!(search(&index, " x ", &SearchConfig::default()).is_empty());
    }

    #[test]
    fn test_result_fields() {
        let mut index = SearchIndex::new();
        index.index_document("notes/a.md", "a.md", "the quick brown fox jumps");

        let results = search(&index, "fox", &SearchConfig::default());
        check!(results.len() == 1);
        check!(results[0].path == "notes/a.md");
        check!(results[0].name == "a.md");
        check!(results[0].match_count == results[0].matches.len());
        check!(results[0].search_type == SearchType::Single);
    }
}

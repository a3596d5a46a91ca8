//! Match finders: single term, exact phrase and multi-term proximity.
//!
//! All finders share one context-window policy: a match's context is the
//! normalized text from `context_length` bytes before the match to
//! `context_length` bytes after it, clamped to the document, with `...` added
//! on each side that was cut.

use serde::Serialize;

use super::index::IndexedDocument;
use super::mark::{MarkStyle, TermMarker};
use super::query::{Query, SearchType};
use crate::config::SearchConfig;

const ELLIPSIS: &str = "...";

/// One located occurrence, or one proximity cluster, within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Byte offset into the normalized text
    pub start: usize,
    pub length: usize,
    /// Approximate 1-based line in the original text
    pub line_number: usize,
    /// Surrounding normalized text, with ellipses where it was cut
    pub context: String,
    /// `context` rendered as HTML with the terms marked
    pub snippet: String,
    /// Literal text of each term occurrence in a proximity cluster
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub terms_found: Vec<String>,
}

/// A single term occurrence used while building proximity clusters.
#[derive(Debug, Clone, Copy)]
struct Occurrence {
    start: usize,
    end: usize,
    term: usize,
}

/// Finds matches for one parsed query.
///
/// Term patterns are compiled once in [`Matcher::new`] and reused for every
/// document in the index.
#[derive(Debug)]
pub struct Matcher<'c> {
    config: &'c SearchConfig,
    search_type: SearchType,
    /// One compiled pattern per distinct term, in query order
    patterns: Vec<TermMarker>,
    /// Combined pattern used to mark snippets
    marker: TermMarker,
}

impl<'c> Matcher<'c> {
    /// Returns `None` when the query has nothing to search for.
    pub fn new(query: &Query, config: &'c SearchConfig) -> Option<Self> {
        let search_type = query.search_type()?;
        let terms = query.terms();

        let patterns = terms
            .iter()
            .map(|term| TermMarker::new(&[term]))
            .collect::<Option<Vec<_>>>()?;
        let marker = TermMarker::new(terms.as_slice())?;

        Some(Self {
            config,
            search_type,
            patterns,
            marker,
        })
    }

    pub const fn search_type(&self) -> SearchType {
        self.search_type
    }

    /// Runs the finder this query routes to against one document.
    pub fn find(&self, document: &IndexedDocument) -> Vec<Match> {
        match self.search_type {
            SearchType::Single | SearchType::Exact => self.find_occurrences(document),
            SearchType::Proximity => self.find_proximity(document),
        }
    }

    /// Every occurrence of the single term (or exact phrase) is one match.
    fn find_occurrences(&self, document: &IndexedDocument) -> Vec<Match> {
        let text = &document.normalized;

        self.patterns[0]
            .find_iter(text)
            .take(self.config.max_matches_per_document)
            .map(|span| {
                let mut found = self.build_match(document, span.range.start, span.range.end);
                found.snippet = self.marker.mark_html(&found.context, MarkStyle::Plain);
                found
            })
            .collect()
    }

    /// Clusters nearby occurrences of different terms.
    ///
    /// A document qualifies only if every term occurs somewhere in it. Clusters
    /// are built greedily in offset order: each unused occurrence seeds a
    /// cluster and pulls in the unused occurrences of other terms whose start
    /// lies within `proximity_distance` of the seed, one per term. Clusters with
    /// fewer than two distinct terms are dropped.
    fn find_proximity(&self, document: &IndexedDocument) -> Vec<Match> {
        let text = &document.normalized;

        let mut occurrences = Vec::new();
        for (term, pattern) in self.patterns.iter().enumerate() {
            let before = occurrences.len();
            occurrences.extend(pattern.find_iter(text).map(|span| Occurrence {
                start: span.range.start,
                end: span.range.end,
                term,
            }));
            if occurrences.len() == before {
                return vec![];
            }
        }
        occurrences.sort_by_key(|occurrence| occurrence.start);

        let clusters = self.cluster(&occurrences);

        clusters
            .into_iter()
            .map(|cluster| {
                let start = cluster.iter().map(|o| o.start).min().unwrap_or(0);
                let end = cluster.iter().map(|o| o.end).max().unwrap_or(start);

                let mut found = self.build_match(document, start, end);
                found.snippet = self.marker.mark_html(&found.context, MarkStyle::Rotating);
                found.terms_found = cluster
                    .iter()
                    .map(|o| text[o.start..o.end].to_string())
                    .collect();
                found
            })
            .collect()
    }

    fn cluster(&self, occurrences: &[Occurrence]) -> Vec<Vec<Occurrence>> {
        let max_distance = self.config.proximity_distance;
        let mut used = vec![false; occurrences.len()];
        let mut clusters = Vec::new();

        for (seed_index, seed) in occurrences.iter().enumerate() {
            if clusters.len() >= self.config.max_matches_per_document {
                break;
            }
            if used[seed_index] {
                continue;
            }
            used[seed_index] = true;

            let mut cluster = vec![*seed];
            let mut terms = vec![seed.term];

            for (other_index, other) in occurrences.iter().enumerate() {
                if used[other_index] || terms.contains(&other.term) {
                    continue;
                }
                if other.start.abs_diff(seed.start) <= max_distance {
                    cluster.push(*other);
                    terms.push(other.term);
                    used[other_index] = true;
                }
            }

            if terms.len() >= 2 {
                clusters.push(cluster);
            }
        }

        clusters
    }

    /// Builds a match for `[start, end)` with context and line estimate.
    /// The snippet is filled in by the caller.
    fn build_match(&self, document: &IndexedDocument, start: usize, end: usize) -> Match {
        let text = &document.normalized;
        let width = self.config.context_length;

        let context_start = floor_char_boundary(text, start.saturating_sub(width));
        let context_end = ceil_char_boundary(text, end.saturating_add(width).min(text.len()));

        let mut context = String::with_capacity(context_end - context_start + 2 * ELLIPSIS.len());
        if context_start > 0 {
            context.push_str(ELLIPSIS);
        }
        context.push_str(&text[context_start..context_end]);
        if context_end < text.len() {
            context.push_str(ELLIPSIS);
        }

        Match {
            start,
            length: end - start,
            line_number: estimate_line(start, text.len(), document.line_count),
            context,
            snippet: String::new(),
            terms_found: vec![],
        }
    }
}

/// Maps a normalized-text offset to an approximate original line number.
///
/// Normalization changes text length unevenly, so this is a proportional
/// estimate, never below 1.
pub fn estimate_line(offset: usize, normalized_len: usize, line_count: usize) -> usize {
    if normalized_len == 0 {
        return 1;
    }
    let ratio = offset as f64 / normalized_len as f64;
    ((ratio * line_count as f64).floor() as usize).max(1)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use std::time::SystemTime;

    fn document(text: &str) -> IndexedDocument {
        IndexedDocument {
            path: "doc.md".into(),
            name: "doc.md".into(),
            original: text.into(),
            normalized: super::super::normalize::normalize(text),
            line_count: text.split('\n').count(),
            indexed_at: SystemTime::now(),
        }
    }

    fn find(text: &str, query: &str, config: &SearchConfig) -> Vec<Match> {
        let query = Query::parse(query);
        let_assert!(Some(matcher) = Matcher::new(&query, config));
        matcher.find(&document(text))
    }

    #[test]
    fn test_single_term() {
        let config = SearchConfig::default();
        let matches = find("the quick brown fox jumps", "fox", &config);

        check!(matches.len() == 1);
        check!(matches[0].start == 16);
        check!(matches[0].length == 3);
        check!(matches[0].context.contains("brown fox jumps"));
        check!(matches[0].snippet.contains("<mark class=\"search-highlight\">fox</mark>"));
        check!(matches[0].terms_found.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let config = SearchConfig::default();
        let matches = find("Fox FOX fox", "fOx", &config);
        check!(matches.len() == 3);
        for found in &matches {
            check!(found.context.to_lowercase().contains("fox"));
        }
    }

    #[test]
    fn test_cap_per_document() {
        let config = SearchConfig::default();
        let text = "word ".repeat(25);
        check!(find(&text, "word", &config).len() == 10);
    }

    #[test]
    fn test_context_window_and_ellipses() {
        let config = SearchConfig {
            context_length: 5,
            ..SearchConfig::default()
        };
        let matches = find("aaaaaaaaaa needle bbbbbbbbbb", "needle", &config);
        check!(matches[0].context == "...aaaa needle bbbb...");

        let matches = find("needle b", "needle", &config);
        check!(matches[0].context == "needle b");
    }

    #[test]
    fn test_context_respects_char_boundaries() {
        let config = SearchConfig {
            context_length: 1,
            ..SearchConfig::default()
        };
        let matches = find("ééxéé", "x", &config);
        check!(matches[0].context == "...éxé...");
    }

    #[test]
    fn test_exact_phrase() {
        let config = SearchConfig::default();
        let query = Query::parse("\"brown fox\"");
        let_assert!(Some(matcher) = Matcher::new(&query, &config));
        check!(matcher.search_type() == SearchType::Exact);

        let matches = matcher.find(&document("the quick brown fox jumps over the brown dog"));
        check!(matches.len() == 1);
        check!(matches[0].length == "brown fox".len());
    }

    #[test]
    fn test_exact_phrase_keeps_stop_words() {
        let config = SearchConfig::default();
        let matches = find("casa de papel e casa", "\"casa de papel\"", &config);
        check!(matches.len() == 1);
    }

    #[test]
    fn test_proximity_cluster() {
        let config = SearchConfig::default();
        let matches = find("the quick brown fox jumps", "quick jumps", &config);

        check!(matches.len() == 1);
        check!(matches[0].start == 4);
        check!(matches[0].length == "quick brown fox jumps".len());
        check!(matches[0].terms_found == ["quick", "jumps"]);
        check!(matches[0].snippet.contains("search-highlight-0\">quick</mark>"));
        check!(matches[0].snippet.contains("search-highlight-1\">jumps</mark>"));
    }

    #[test]
    fn test_proximity_requires_every_term() {
        let config = SearchConfig::default();
        let text = "quick ".repeat(30);
        check!(find(&text, "quick missing", &config).is_empty());
    }

    #[test]
    fn test_proximity_terms_too_far_apart() {
        let config = SearchConfig::default();
        let text = format!("alpha {} omega", "x".repeat(300));
        check!(find(&text, "alpha omega", &config).is_empty());
    }

    #[test]
    fn test_proximity_one_occurrence_per_term() {
        let config = SearchConfig::default();
        // Second "alpha" cannot join the first cluster; it seeds its own with the second "beta"
        let matches = find("alpha alpha beta beta", "alpha beta", &config);
        check!(matches.len() == 2);
        for found in &matches {
            check!(found.terms_found.len() == 2);
        }
    }

    #[test]
    fn test_proximity_greedy_seed_order() {
        let config = SearchConfig {
            proximity_distance: 10,
            ..SearchConfig::default()
        };
        // "aa" at 0 seeds and takes "bb" at 9; "bb" at 14 is then left alone
        let matches = find("aa xxxxx bb x bb", "aa bb", &config);
        check!(matches.len() == 1);
        check!(matches[0].start == 0);
        check!(matches[0].length == 11);
    }

    #[rstest]
    #[case(0, 100, 10, 1)]
    #[case(50, 100, 10, 5)]
    #[case(99, 100, 10, 9)]
    #[case(5, 100, 1, 1)]
    #[case(0, 0, 3, 1)]
    fn test_estimate_line(
        #[case] offset: usize,
        #[case] len: usize,
        #[case] lines: usize,
        #[case] expected: usize,
    ) {
        check!(estimate_line(offset, len, lines) == expected);
    }

    #[test]
    fn test_empty_query_has_no_matcher() {
        let config = SearchConfig::default();
        check!(Matcher::new(&Query::parse("e"), &config).is_none());
    }
}

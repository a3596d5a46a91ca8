//! Query parsing shared by the match finders and the highlighter.
//!
//! Both sides must agree on which terms matter, so every consumer derives its
//! terms through [`Query::parse`].

use super::stopwords::filter_stop_words;
use serde::Serialize;
use std::fmt;

/// Which finder produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Single,
    Exact,
    Proximity,
}

impl SearchType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Exact => "exact",
            Self::Proximity => "proximity",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// The whole query was wrapped in double quotes. Matched verbatim,
    /// without stop-word filtering.
    Exact(String),
    /// Terms that survived stop-word filtering, in query order. Never empty.
    Terms(Vec<String>),
    /// Every term was a stop word (or the query was blank).
    Empty,
}

impl Query {
    /// Parses a raw query string.
    ///
    /// Shapes are tried in priority order: quoted phrase, whitespace-separated
    /// terms, single term. The query is trimmed and lower-cased first, and a
    /// term repeated in the query is kept once.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();

        if let Some(phrase) = exact_phrase(&normalized) {
            return Self::Exact(phrase.to_string());
        }

        let mut terms: Vec<&str> = Vec::new();
        for term in normalized.split_whitespace() {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        let terms = filter_stop_words(&terms);

        if terms.is_empty() {
            Self::Empty
        } else {
            Self::Terms(terms)
        }
    }

    /// The finder this query routes to, or `None` when there is nothing to search.
    pub fn search_type(&self) -> Option<SearchType> {
        match self {
            Self::Exact(_) => Some(SearchType::Exact),
            Self::Terms(terms) if terms.len() > 1 => Some(SearchType::Proximity),
            Self::Terms(_) => Some(SearchType::Single),
            Self::Empty => None,
        }
    }

    /// Literal strings to look for, in query order.
    pub fn terms(&self) -> Vec<&str> {
        match self {
            Self::Exact(phrase) => vec![phrase.as_str()],
            Self::Terms(terms) => terms.iter().map(String::as_str).collect(),
            Self::Empty => vec![],
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Returns the interior of a query wrapped in double quotes, if non-empty.
fn exact_phrase(query: &str) -> Option<&str> {
    query
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|inner| !inner.is_empty())
}

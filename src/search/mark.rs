//! Single-pass term marking shared by snippets and inline highlighting.
//!
//! All terms are compiled into one case-insensitive alternation, so each
//! character of the input is visited once and inserted markup is never
//! re-scanned by a later term.

use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// CSS class carried by every highlight mark.
pub const HIGHLIGHT_CLASS: &str = "search-highlight";

/// Number of rotating classes used to tell multi-term highlights apart.
pub const PALETTE_SIZE: usize = 3;

/// How marks produced for a term set are styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkStyle {
    /// Every mark gets the plain highlight class
    Plain,
    /// Marks get an extra class chosen by term index, cycling through the palette
    Rotating,
}

impl MarkStyle {
    /// Full `class` attribute value for a mark of the given term.
    pub fn class_for(self, term_index: usize) -> String {
        match self {
            Self::Plain => HIGHLIGHT_CLASS.to_string(),
            Self::Rotating => format!(
                "{HIGHLIGHT_CLASS} {HIGHLIGHT_CLASS}-{}",
                term_index % PALETTE_SIZE
            ),
        }
    }
}

/// A located term occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpan {
    pub range: Range<usize>,
    /// Index of the matched term in the original term list
    pub term_index: usize,
}

/// Compiled matcher for a list of literal terms.
#[derive(Debug, Clone)]
pub struct TermMarker {
    regex: Regex,
    /// Capture group number (minus one) to original term index
    group_terms: Vec<usize>,
}

impl TermMarker {
    /// Compiles the terms. Returns `None` when no non-empty term is given.
    ///
    /// Longer terms are tried first so that a term which is a prefix of
    /// another does not cut the longer match short.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Option<Self> {
        let mut ordered: Vec<(usize, &str)> = terms
            .iter()
            .map(|term| term.as_ref())
            .enumerate()
            .filter(|(_, term)| !term.is_empty())
            .collect();
        if ordered.is_empty() {
            return None;
        }
        ordered.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));

        let pattern = ordered
            .iter()
            .map(|(_, term)| format!("({})", regex::escape(term)))
            .collect::<Vec<_>>()
            .join("|");

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .ok()?;

        Some(Self {
            regex,
            group_terms: ordered.into_iter().map(|(index, _)| index).collect(),
        })
    }

    /// All non-overlapping occurrences in `text`, left to right.
    pub fn find_iter<'t>(&'t self, text: &'t str) -> impl Iterator<Item = MarkSpan> + 't {
        self.regex.captures_iter(text).filter_map(|caps| {
            let (group, m) = caps
                .iter()
                .enumerate()
                .skip(1)
                .find_map(|(group, m)| m.map(|m| (group, m)))?;
            Some(MarkSpan {
                range: m.range(),
                term_index: self.group_terms[group - 1],
            })
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Renders `text` as HTML with every occurrence wrapped in a `<mark>`.
    /// Text outside and inside the marks is escaped.
    pub fn mark_html(&self, text: &str, style: MarkStyle) -> String {
        let mut output = String::with_capacity(text.len() + 32);
        let mut cursor = 0;

        for span in self.find_iter(text) {
            output.push_str(&escape_html(&text[cursor..span.range.start]));
            output.push_str("<mark class=\"");
            output.push_str(&style.class_for(span.term_index));
            output.push_str("\">");
            output.push_str(&escape_html(&text[span.range.clone()]));
            output.push_str("</mark>");
            cursor = span.range.end;
        }
        output.push_str(&escape_html(&text[cursor..]));

        output
    }
}

/// Escapes the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

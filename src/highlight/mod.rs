//! Inline highlighting of query terms inside a rendered document.
//!
//! The [`Highlighter`] never touches a concrete document model. It works
//! through a [`SegmentProvider`], which hands out text segments, reports the
//! elements enclosing them and splices marked pieces back in.
//! [`RenderTree`] is the provider used for rendered Markdown.

mod tree;

pub use tree::{NodeId, RenderTree};

use crate::config::HighlightConfig;
use crate::error::HighlightError;
use crate::search::{MarkStyle, Query, SearchType, TermMarker};

/// Identifies a text segment within a provider.
pub type SegmentId = usize;

/// Tag and classes of an element enclosing a text segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    pub tag: String,
    pub classes: Vec<String>,
}

impl ElementInfo {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// One piece of a segment after highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Mark { text: String, class: String },
}

/// Access to the text of a rendered document.
pub trait SegmentProvider {
    /// Every text segment in document order.
    ///
    /// Taken as a snapshot before any replacement, so segments created by
    /// highlighting are never visited in the same pass.
    fn segments(&self) -> Vec<SegmentId>;

    fn segment_text(&self, id: SegmentId) -> Result<String, HighlightError>;

    /// Elements enclosing the segment, nearest first.
    fn ancestors(&self, id: SegmentId) -> Result<Vec<ElementInfo>, HighlightError>;

    /// Replaces the segment with the given pieces, in order.
    fn replace_segment(&mut self, id: SegmentId, pieces: Vec<Piece>) -> Result<(), HighlightError>;

    /// Unwraps every existing highlight mark back into plain text.
    /// Returns the number of marks removed.
    fn remove_marks(&mut self) -> usize;
}

/// Counts from one highlight pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightReport {
    /// Marks left over from the previous pass
    pub removed: usize,
    /// Marks inserted by this pass
    pub marks: usize,
    /// Segments that received at least one mark
    pub segments: usize,
    /// Segments skipped because they failed to update
    pub failed: usize,
}

/// Applies query highlights to a [`SegmentProvider`].
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    pub const fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    /// Removes previous highlights, then marks every occurrence of the query's
    /// terms outside excluded regions.
    ///
    /// Terms come from [`Query::parse`], so the highlighted words are exactly
    /// the ones the search matched on. An unquoted query with more than one
    /// word gets rotating classes, even when stop words leave a single term.
    /// A segment that fails to update is logged and skipped.
    pub fn highlight_term<P: SegmentProvider>(&self, query: &str, provider: &mut P) -> HighlightReport {
        let mut report = HighlightReport {
            removed: provider.remove_marks(),
            ..HighlightReport::default()
        };

        if query.trim().chars().count() < self.config.min_query_length {
            return report;
        }

        let parsed = Query::parse(query);
        let Some(search_type) = parsed.search_type() else {
            tracing::debug!("Nothing to highlight for '{}'", query);
            return report;
        };
        let Some(marker) = TermMarker::new(parsed.terms().as_slice()) else {
            return report;
        };
        let style = match search_type {
            SearchType::Exact => MarkStyle::Plain,
            SearchType::Single | SearchType::Proximity if query.split_whitespace().nth(1).is_some() => {
                MarkStyle::Rotating
            }
            SearchType::Single | SearchType::Proximity => MarkStyle::Plain,
        };

        for id in provider.segments() {
            match self.highlight_segment(provider, id, &marker, style) {
                Ok(0) => {}
                Ok(marks) => {
                    report.marks += marks;
                    report.segments += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping segment while highlighting '{}': {}", query, e);
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            "Highlighted '{}': {} mark(s) in {} segment(s)",
            query,
            report.marks,
            report.segments
        );
        report
    }

    /// Removes every highlight mark.
    pub fn clear<P: SegmentProvider>(&self, provider: &mut P) -> usize {
        provider.remove_marks()
    }

    fn highlight_segment<P: SegmentProvider>(
        &self,
        provider: &mut P,
        id: SegmentId,
        marker: &TermMarker,
        style: MarkStyle,
    ) -> Result<usize, HighlightError> {
        let text = provider.segment_text(id)?;
        if !marker.is_match(&text) {
            return Ok(0);
        }
        if self.is_excluded(&provider.ancestors(id)?) {
            return Ok(0);
        }

        let pieces = split_marked(&text, marker, style);
        let marks = pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Mark { .. }))
            .count();
        provider.replace_segment(id, pieces)?;
        Ok(marks)
    }

    fn is_excluded(&self, ancestors: &[ElementInfo]) -> bool {
        ancestors.iter().any(|element| {
            self.config.excluded_tags.iter().any(|tag| *tag == element.tag)
                || self
                    .config
                    .excluded_classes
                    .iter()
                    .any(|class| element.has_class(class))
        })
    }
}

/// Splits `text` into plain and marked pieces, keeping the original casing.
pub fn split_marked(text: &str, marker: &TermMarker, style: MarkStyle) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut cursor = 0;

    for span in marker.find_iter(text) {
        if span.range.start > cursor {
            pieces.push(Piece::Text(text[cursor..span.range.start].to_string()));
        }
        pieces.push(Piece::Mark {
            text: text[span.range.clone()].to_string(),
            class: style.class_for(span.term_index),
        });
        cursor = span.range.end;
    }
    if cursor < text.len() {
        pieces.push(Piece::Text(text[cursor..].to_string()));
    }

    pieces
}

//! In-memory document index keyed by path.

use ahash::AHashMap;
use serde::Serialize;
use std::time::SystemTime;

use super::normalize::normalize;

/// A document as stored in the search index.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    /// Unique identity of the document
    pub path: String,
    /// Display name (file name)
    pub name: String,
    /// Raw text as loaded
    pub original: String,
    /// Markup-free text that matching runs against
    pub normalized: String,
    /// Number of lines in the raw text, used for line estimates
    pub line_count: usize,
    pub indexed_at: SystemTime,
}

/// Summary of the index contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub indexed_files: usize,
    /// Total bytes of normalized text across all documents
    pub total_size: usize,
    pub is_indexing: bool,
    /// Most recent indexing time, if anything is indexed
    #[serde(skip)]
    pub last_update: Option<SystemTime>,
}

/// Maps document paths to their normalized text.
///
/// Iteration follows insertion order. Re-indexing a path replaces the record in
/// place, so it keeps its original position.
#[derive(Debug, Default)]
pub struct SearchIndex {
    documents: Vec<IndexedDocument>,
    positions: AHashMap<String, usize>,
    /// Batches currently running
    batches: usize,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and stores a document, overwriting any previous record for
    /// the same path. Returns false (and stores nothing) for empty content.
    pub fn index_document(&mut self, path: &str, name: &str, content: &str) -> bool {
        if path.is_empty() || content.is_empty() {
            return false;
        }

        let document = IndexedDocument {
            path: path.to_string(),
            name: name.to_string(),
            original: content.to_string(),
            normalized: normalize(content),
            line_count: content.split('\n').count(),
            indexed_at: SystemTime::now(),
        };

        match self.positions.get(path) {
            Some(&position) => self.documents[position] = document,
            None => {
                self.positions.insert(path.to_string(), self.documents.len());
                self.documents.push(document);
            }
        }

        tracing::debug!("Indexed document: {}", name);
        true
    }

    /// Deletes a single document. Returns the removed record, if any.
    pub fn remove_document(&mut self, path: &str) -> Option<IndexedDocument> {
        let position = self.positions.remove(path)?;
        let removed = self.documents.remove(position);

        // Everything after the removed slot shifted down by one
        for document in &self.documents[position..] {
            if let Some(slot) = self.positions.get_mut(&document.path) {
                *slot -= 1;
            }
        }

        Some(removed)
    }

    /// Empties the index. Used when the document collection is replaced.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.positions.clear();
        tracing::info!("Search index cleared");
    }

    pub fn contains(&self, path: &str) -> bool {
        self.positions.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&IndexedDocument> {
        self.positions.get(path).map(|&position| &self.documents[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedDocument> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub(crate) const fn begin_batch(&mut self) {
        self.batches += 1;
    }

    pub(crate) const fn finish_batch(&mut self) {
        self.batches = self.batches.saturating_sub(1);
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            indexed_files: self.documents.len(),
            total_size: self.documents.iter().map(|d| d.normalized.len()).sum(),
            is_indexing: self.batches > 0,
            last_update: self.documents.iter().map(|d| d.indexed_at).max(),
        }
    }
}

//! Shared search state: the index, the document tree, batch indexing and the
//! debounced search entry point.
//!
//! Tool handlers share one [`ContentSearcher`] behind an `Arc`. Locks are never
//! held across a provider fetch, so a slow document never blocks searches.

use crate::config::SearchConfig;
use crate::error::ProviderError;
use crate::provider::{DocumentProvider, DocumentTree, TreeNode};
use crate::search::{self, IndexStats, IndexedDocument, SearchIndex, SearchResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Result of a debounced search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query ran; results are ranked and capped.
    Completed(Vec<SearchResult>),
    /// A newer query arrived during the debounce window. Nothing was searched.
    Superseded,
}

impl SearchOutcome {
    /// Results of a completed search, or `None` if it was superseded.
    pub fn into_results(self) -> Option<Vec<SearchResult>> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Superseded => None,
        }
    }

    pub const fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Owns the search index and everything needed to fill and query it.
pub struct ContentSearcher {
    provider: Arc<dyn DocumentProvider>,
    config: SearchConfig,

    index: RwLock<SearchIndex>,
    tree: RwLock<DocumentTree>,

    /// Bumped by every debounced search; only the latest may run
    generation: AtomicU64,
    /// Cancels the search currently waiting out its debounce window
    pending: Mutex<Option<CancellationToken>>,
}

impl std::fmt::Debug for ContentSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSearcher")
            .field("config", &self.config)
            .field("indexed", &self.index.try_read().map(|i| i.len()).ok())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ContentSearcher {
    pub fn new(provider: Arc<dyn DocumentProvider>, config: SearchConfig) -> Self {
        Self {
            provider,
            config,
            index: RwLock::new(SearchIndex::new()),
            tree: RwLock::new(DocumentTree::default()),
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
        }
    }

    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Indexes a document the user just opened.
    pub async fn on_document_opened(&self, file: &TreeNode, content: &str) -> bool {
        self.index
            .write()
            .await
            .index_document(&file.path, &file.name, content)
    }

    /// Loads a document for viewing and indexes it.
    ///
    /// The display name comes from the tree when the path is listed there,
    /// otherwise from the last path segment.
    pub async fn open_document(&self, path: &str) -> Result<String, ProviderError> {
        let content = self.provider.load(path).await?;
        let file = match self.tree.read().await.find(path) {
            Some(node) => node.clone(),
            None => TreeNode::file(path.rsplit('/').next().unwrap_or(path), path),
        };
        self.on_document_opened(&file, &content).await;
        Ok(content)
    }

    /// Replaces the document tree and drops everything indexed from the old one.
    pub async fn on_structure_reloaded(&self, tree: DocumentTree) {
        *self.tree.write().await = tree;
        self.clear_index().await;
    }

    pub async fn tree(&self) -> DocumentTree {
        self.tree.read().await.clone()
    }

    /// Indexes every document in the current tree.
    pub async fn index_all_files(&self) -> usize {
        let files: Vec<TreeNode> = self
            .tree
            .read()
            .await
            .markdown_files()
            .into_iter()
            .cloned()
            .collect();
        self.index_multiple_files(&files).await
    }

    /// Loads and indexes documents one at a time, skipping those already indexed.
    ///
    /// Best effort: a document that fails to load is logged and skipped, and the
    /// batch carries on. Returns the number of documents newly indexed.
    pub async fn index_multiple_files(&self, files: &[TreeNode]) -> usize {
        let start = std::time::Instant::now();
        self.index.write().await.begin_batch();
        tracing::info!("Indexing {} file(s)", files.len());

        let mut indexed = 0;
        for file in files {
            if self.index.read().await.contains(&file.path) {
                continue;
            }

            match self.provider.load(&file.path).await {
                Ok(content) => {
                    let mut index = self.index.write().await;
                    if index.index_document(&file.path, &file.name, &content) {
                        indexed += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to index {}: {}", file.path, e);
                }
            }

            // Yield to allow searches to run between documents
            tokio::task::yield_now().await;
        }

        let mut index = self.index.write().await;
        index.finish_batch();
        tracing::info!(
            "Indexing finished: {} new, {} total in {:?}",
            indexed,
            index.len(),
            start.elapsed()
        );
        indexed
    }

    /// Debounced search entry point.
    ///
    /// Waits out the debounce window first. If another query arrives meanwhile,
    /// this call resolves to [`SearchOutcome::Superseded`] without touching the
    /// index. Queries below the minimum length complete immediately with no
    /// results and do not supersede a pending search.
    pub async fn search_in_content(&self, query: &str) -> SearchOutcome {
        if query.trim().chars().count() < self.config.min_search_length {
            return SearchOutcome::Completed(vec![]);
        }

        let token = CancellationToken::new();
        let generation = {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.replace(token.clone()) {
                previous.cancel();
            }
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        tokio::select! {
            () = token.cancelled() => {
                tracing::debug!("Search '{}' superseded during debounce", query);
                return SearchOutcome::Superseded;
            }
            () = tokio::time::sleep(self.config.debounce()) => {}
        }

        if self.generation.load(Ordering::SeqCst) != generation {
            return SearchOutcome::Superseded;
        }

        SearchOutcome::Completed(self.perform_search(query).await)
    }

    /// Runs a query immediately, without debouncing.
    pub async fn perform_search(&self, query: &str) -> Vec<SearchResult> {
        let index = self.index.read().await;
        search::search(&index, query, &self.config)
    }

    pub async fn index_stats(&self) -> IndexStats {
        self.index.read().await.stats()
    }

    /// Returns true if the document was indexed.
    pub async fn remove_from_index(&self, path: &str) -> bool {
        self.index.write().await.remove_document(path).is_some()
    }

    pub async fn clear_index(&self) {
        self.index.write().await.clear();
    }

    /// A copy of an indexed document.
    pub async fn document(&self, path: &str) -> Option<IndexedDocument> {
        self.index.read().await.get(path).cloned()
    }
}

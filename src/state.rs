//! Session state shared by the tool handlers.
//!
//! Holds the configuration and the searcher for the currently open folder.
//! Opening another folder swaps in a fresh searcher, so handlers that still
//! hold the old one finish against the old index.

use crate::config::Config;
use crate::error::Result;
use crate::provider::{DocumentTree, FsProvider};
use crate::searcher::ContentSearcher;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared viewer state.
pub struct ViewerState {
    config: Config,

    /// Root of the open folder
    root: RwLock<Option<PathBuf>>,

    /// Searcher for the open folder
    searcher: RwLock<Option<Arc<ContentSearcher>>>,
}

impl std::fmt::Debug for ViewerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerState")
            .field("config", &self.config)
            .field("root", &self.root.try_read().ok().and_then(|r| r.clone()))
            .finish_non_exhaustive()
    }
}

impl ViewerState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            root: RwLock::new(None),
            searcher: RwLock::new(None),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub async fn root(&self) -> Option<PathBuf> {
        self.root.read().await.clone()
    }

    /// The searcher for the open folder, if any.
    pub async fn searcher(&self) -> Option<Arc<ContentSearcher>> {
        self.searcher.read().await.clone()
    }

    /// Scans `root` and installs a searcher over it. Nothing is indexed yet.
    pub async fn open_folder(&self, root: &Path) -> Result<Arc<ContentSearcher>> {
        let scan_root = root.to_path_buf();
        let tree = tokio::task::spawn_blocking(move || DocumentTree::scan(&scan_root))
            .await
            .context("Folder scan task failed")??;

        let searcher = Arc::new(ContentSearcher::new(
            Arc::new(FsProvider::new(root)),
            self.config.search.clone(),
        ));
        searcher.on_structure_reloaded(tree).await;

        *self.searcher.write().await = Some(searcher.clone());
        *self.root.write().await = Some(root.to_path_buf());
        tracing::info!("Opened folder {}", root.display());

        Ok(searcher)
    }
}

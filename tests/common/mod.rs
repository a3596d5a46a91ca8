//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `searcher`: a [`ContentSearcher`] over an empty in-memory provider
//! - `sample_docs`: a [`TempWorkspace`] holding a small Markdown folder
//!
//! Providers here never touch the filesystem, so tests that need to control
//! timing (debounce, clearing mid-batch) can run with paused tokio time.

use docview::{ContentSearcher, DocumentProvider, ProviderError, SearchConfig, TreeNode};
use futures::FutureExt;
use futures::future::BoxFuture;
use rstest::fixture;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::sync::Notify;

/// In-memory documents keyed by path.
///
/// Paths listed in `failing` return an IO error; paths listed in `gated` wait
/// until [`MapProvider::release`] is called.
#[allow(dead_code)] // Methods used across different integration test crates
#[derive(Default)]
pub struct MapProvider {
    documents: HashMap<String, String>,
    failing: Vec<String>,
    gated: Vec<String>,
    gate: Notify,
    loads: AtomicUsize,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl MapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, content: &str) -> Self {
        self.documents.insert(path.to_string(), content.to_string());
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.push(path.to_string());
        self
    }

    pub fn gated(mut self, path: &str) -> Self {
        self.gated.push(path.to_string());
        self
    }

    /// Lets one waiting gated load continue.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Number of load calls made so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DocumentProvider for MapProvider {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
        async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.gated.iter().any(|p| p == path) {
                self.gate.notified().await;
            }
            if self.failing.iter().any(|p| p == path) {
                return Err(ProviderError::Io {
                    path: path.to_string(),
                    source: std::io::Error::other("simulated read failure"),
                });
            }
            self.documents
                .get(path)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound {
                    path: path.to_string(),
                })
        }
        .boxed()
    }
}

/// Tree nodes for a list of paths, named after their last segment.
#[allow(dead_code)] // Used across different integration test crates
pub fn files(paths: &[&str]) -> Vec<TreeNode> {
    paths
        .iter()
        .map(|path| TreeNode::file(path.rsplit('/').next().unwrap_or(path), *path))
        .collect()
}

/// Builds a searcher over `provider` with default settings.
#[allow(dead_code)] // Used across different integration test crates
pub fn searcher_with(provider: Arc<MapProvider>) -> ContentSearcher {
    ContentSearcher::new(provider, SearchConfig::default())
}

/// A searcher whose provider has no documents; fill it with `on_document_opened`.
#[fixture]
pub fn searcher() -> ContentSearcher {
    docview::tracing::init();
    searcher_with(Arc::new(MapProvider::new()))
}

/// A temporary directory for test isolation, removed when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A small documentation folder with prose, code and a diagram.
#[fixture]
pub fn sample_docs() -> TempWorkspace {
    docview::tracing::init();
    let workspace = TempWorkspace::new();
    workspace.create_file(
        "README.md",
        "# Project\n\nThe quick brown fox jumps over the lazy dog.\n",
    );
    workspace.create_file(
        "guides/setup.md",
        "# Setup\n\nInstall the fox tool, then configure the fox.\n\n```sh\nfox --init\n```\n",
    );
    workspace.create_file(
        "guides/diagrams.md",
        "# Diagrams\n\n```mermaid\ngraph fox --> dog\n```\n\nNo animals here.\n",
    );
    workspace.create_file("notes.txt", "fox fox fox");
    workspace
}

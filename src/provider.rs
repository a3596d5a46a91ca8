//! Document sources: the folder/file tree and the provider that loads file text.

use crate::error::{ProviderError, Result};
use anyhow::Context;
use futures::FutureExt;
use futures::future::BoxFuture;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Extension of the documents that are listed and indexed.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Loads the raw text of a document by its tree path.
///
/// Injected into [`crate::ContentSearcher`] so indexing never reaches for a
/// global file manager.
pub trait DocumentProvider: Send + Sync {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, std::result::Result<String, ProviderError>>;
}

/// Reads documents from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsProvider {
    root: PathBuf,
}

impl FsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a tree path onto the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> std::result::Result<PathBuf, ProviderError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ProviderError::OutsideRoot {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentProvider for FsProvider {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, std::result::Result<String, ProviderError>> {
        async move {
            let full_path = self.resolve(path)?;
            tokio::fs::read_to_string(&full_path)
                .await
                .map_err(|source| match source.kind() {
                    std::io::ErrorKind::NotFound => ProviderError::NotFound {
                        path: path.to_string(),
                    },
                    _ => ProviderError::Io {
                        path: path.to_string(),
                        source,
                    },
                })
        }
        .boxed()
    }
}

/// Whether a tree entry is a document or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// One entry of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    /// Path relative to the tree root, `/`-separated
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::File,
            name: name.into(),
            path: path.into(),
            children: vec![],
        }
    }

    pub fn folder(name: impl Into<String>, path: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            kind: NodeKind::Folder,
            name: name.into(),
            path: path.into(),
            children,
        }
    }

    pub fn is_document(&self) -> bool {
        self.kind == NodeKind::File
            && Path::new(&self.name)
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
    }
}

/// The hierarchy of folders and documents being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentTree {
    pub roots: Vec<TreeNode>,
}

impl DocumentTree {
    pub const fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    /// Builds the tree from the Markdown files under `root`.
    ///
    /// Uses the `ignore` walker, so `.gitignore`d and hidden entries are skipped.
    /// Entries are sorted by path; folders without documents are omitted.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut paths: Vec<String> = Vec::new();
        for entry in WalkBuilder::new(root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let is_document = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
            if !is_document {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .with_context(|| format!("Walked outside of {}", root.display()))?;
            let components: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            paths.push(components.join("/"));
        }
        paths.sort();

        let mut tree = Self::default();
        for path in &paths {
            let components: Vec<&str> = path.split('/').collect();
            insert_path(&mut tree.roots, &components, "");
        }

        tracing::info!(
            "Scanned {}: {} document(s)",
            root.display(),
            tree.document_count()
        );
        Ok(tree)
    }

    /// Parses a `structure.json`-style description of the tree.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse document tree")
    }

    /// All documents in depth-first order.
    pub fn markdown_files(&self) -> Vec<&TreeNode> {
        fn collect<'t>(nodes: &'t [TreeNode], files: &mut Vec<&'t TreeNode>) {
            for node in nodes {
                match node.kind {
                    NodeKind::File if node.is_document() => files.push(node),
                    NodeKind::File => {}
                    NodeKind::Folder => collect(&node.children, files),
                }
            }
        }

        let mut files = Vec::new();
        collect(&self.roots, &mut files);
        files
    }

    pub fn document_count(&self) -> usize {
        self.markdown_files().len()
    }

    /// Looks up a document by path.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        self.markdown_files().into_iter().find(|node| node.path == path)
    }

    /// File-name search: keeps files whose name contains `term` and folders
    /// whose own name matches or that still have matching descendants.
    /// A matching folder keeps only its matching children.
    pub fn filter_by_name(&self, term: &str) -> Self {
        fn filter(nodes: &[TreeNode], term: &str) -> Vec<TreeNode> {
            nodes
                .iter()
                .filter_map(|node| {
                    let name_matches = node.name.to_lowercase().contains(term);
                    match node.kind {
                        NodeKind::File => name_matches.then(|| node.clone()),
                        NodeKind::Folder => {
                            let children = filter(&node.children, term);
                            (name_matches || !children.is_empty()).then(|| {
                                TreeNode::folder(node.name.clone(), node.path.clone(), children)
                            })
                        }
                    }
                })
                .collect()
        }

        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.clone();
        }
        Self::new(filter(&self.roots, &term))
    }
}

fn insert_path(nodes: &mut Vec<TreeNode>, components: &[&str], prefix: &str) {
    let Some((first, rest)) = components.split_first() else {
        return;
    };
    let path = if prefix.is_empty() {
        (*first).to_string()
    } else {
        format!("{prefix}/{first}")
    };

    if rest.is_empty() {
        nodes.push(TreeNode::file(*first, path));
        return;
    }

    let position = match nodes
        .iter()
        .position(|n| n.kind == NodeKind::Folder && n.name == *first)
    {
        Some(position) => position,
        None => {
            nodes.push(TreeNode::folder(*first, path.clone(), vec![]));
            nodes.len() - 1
        }
    };
    insert_path(&mut nodes[position].children, rest, &path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    fn sample_tree() -> DocumentTree {
        DocumentTree::new(vec![
            TreeNode::folder(
                "guides",
                "guides",
                vec![
                    TreeNode::file("intro.md", "guides/intro.md"),
                    TreeNode::file("setup.md", "guides/setup.md"),
                    TreeNode::file("diagram.png", "guides/diagram.png"),
                ],
            ),
            TreeNode::file("README.md", "README.md"),
        ])
    }

    #[test]
    fn test_markdown_files_flattened() {
        let tree = sample_tree();
        let paths: Vec<_> = tree.markdown_files().iter().map(|n| n.path.as_str()).collect();
        check!(paths == ["guides/intro.md", "guides/setup.md", "README.md"]);
    }

    #[test]
    fn test_filter_by_name() {
        let tree = sample_tree();

        let filtered = tree.filter_by_name("SETUP");
        let paths: Vec<_> = filtered.markdown_files().iter().map(|n| n.path.as_str()).collect();
        check!(paths == ["guides/setup.md"]);

        // Folder name matches but none of its files do
        let filtered = tree.filter_by_name("guides");
        check!(filtered.roots.len() == 1);
        check!(filtered.roots[0].children.is_empty());

        check!(tree.filter_by_name("nothing").roots.is_empty());
    }

    #[test]
    fn test_json_round_shape() {
        let json = r#"[
            {"type": "folder", "name": "a", "path": "a", "children": [
                {"type": "file", "name": "b.md", "path": "a/b.md"}
            ]}
        ]"#;
        let_assert!(Ok(tree) = DocumentTree::from_json(json));
        check!(tree.document_count() == 1);
        check!(tree.find("a/b.md").is_some());
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("guides/deep")).unwrap();
        std::fs::write(dir.path().join("README.md"), "# Readme").unwrap();
        std::fs::write(dir.path().join("guides/intro.md"), "intro").unwrap();
        std::fs::write(dir.path().join("guides/deep/more.md"), "more").unwrap();
        std::fs::write(dir.path().join("guides/notes.txt"), "not a document").unwrap();

        let_assert!(Ok(tree) = DocumentTree::scan(dir.path()));
        let paths: Vec<_> = tree.markdown_files().iter().map(|n| n.path.as_str()).collect();
        check!(paths == ["README.md", "guides/deep/more.md", "guides/intro.md"]);
    }

    #[tokio::test]
    async fn test_fs_provider() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "content").unwrap();
        let provider = FsProvider::new(dir.path());

        let_assert!(Ok(text) = provider.load("a.md").await);
        check!(text == "content");

        let_assert!(Err(ProviderError::NotFound { .. }) = provider.load("missing.md").await);
        let_assert!(Err(ProviderError::OutsideRoot { .. }) = provider.load("../etc/passwd").await);
        let_assert!(Err(ProviderError::OutsideRoot { .. }) = provider.load("/etc/passwd").await);
    }
}

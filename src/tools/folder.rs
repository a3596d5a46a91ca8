//! Opening a folder of documents.

use crate::server::expand_tilde;
use crate::state::ViewerState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OpenFolderRequest {
    /// Path to a directory containing Markdown files
    pub path: String,
}

/// Opens a folder, replacing any previous one, and indexes every document in it.
pub async fn handle_open_folder(
    state: &Arc<ViewerState>,
    request: OpenFolderRequest,
) -> Result<String, String> {
    let expanded = expand_tilde(&request.path);
    let root = tokio::fs::canonicalize(expanded.as_ref())
        .await
        .map_err(|e| format!("Failed to resolve path '{}': {}", request.path, e))?;
    let metadata = tokio::fs::metadata(&root)
        .await
        .map_err(|e| format!("Failed to read '{}': {}", root.display(), e))?;
    if !metadata.is_dir() {
        return Err(format!("Path is not a directory: {}", root.display()));
    }

    let previous = state.root().await;
    let searcher = state
        .open_folder(&root)
        .await
        .map_err(|e| format!("Failed to open folder: {e:#}"))?;
    let indexed = searcher.index_all_files().await;
    let documents = searcher.tree().await.document_count();

    Ok(format_response(&root, previous.as_deref(), documents, indexed))
}

/// Summary of an opened folder.
pub fn format_response(
    root: &Path,
    previous: Option<&Path>,
    documents: usize,
    indexed: usize,
) -> String {
    let mut response = format!("Folder opened: {}\n", root.display());
    if let Some(previous) = previous.filter(|p| *p != root) {
        let _ = writeln!(response, "Replaced: {}", previous.display());
    }
    response.push('\n');

    let _ = writeln!(response, "Documents found: {}", documents);
    let _ = writeln!(response, "Documents indexed: {}", indexed);
    if indexed < documents {
        let _ = writeln!(
            response,
            "Skipped {} empty or unreadable document(s); see the server log for details.",
            documents - indexed
        );
    }

    response
}

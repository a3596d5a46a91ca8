//! File-name search over the document tree.

use super::require_searcher;
use crate::provider::{NodeKind, TreeNode};
use crate::state::ViewerState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindFilesRequest {
    /// Case-insensitive text to look for in file and folder names. Empty lists everything.
    #[serde(default)]
    pub term: String,
}

/// Lists the part of the document tree whose names contain the term.
pub async fn handle_find_files(
    state: &Arc<ViewerState>,
    request: FindFilesRequest,
) -> Result<String, String> {
    let searcher = require_searcher(state).await?;
    let filtered = searcher.tree().await.filter_by_name(&request.term);

    if filtered.roots.is_empty() {
        return Ok(format!("No files or folders match '{}'.", request.term));
    }

    let mut output = format!(
        "{} document(s) match '{}':\n\n",
        filtered.document_count(),
        request.term
    );
    write_nodes(&mut output, &filtered.roots, 0);
    Ok(output)
}

fn write_nodes(output: &mut String, nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node.kind {
            NodeKind::Folder => {
                let _ = writeln!(output, "{}{}/", indent, node.name);
                write_nodes(output, &node.children, depth + 1);
            }
            NodeKind::File => {
                let _ = writeln!(output, "{}{} ({})", indent, node.name, node.path);
            }
        }
    }
}

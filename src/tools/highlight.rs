//! Rendering a document with the query's terms highlighted.

use super::require_searcher;
use crate::highlight::{Highlighter, RenderTree};
use crate::state::ViewerState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HighlightDocumentRequest {
    /// Path of the document relative to the open folder
    pub path: String,
    /// Query whose terms should be highlighted
    pub query: String,
}

/// Opens a document, renders it and marks the query's terms outside code and diagrams.
///
/// Opening the document also indexes it.
pub async fn handle_highlight_document(
    state: &Arc<ViewerState>,
    request: HighlightDocumentRequest,
) -> Result<String, String> {
    let searcher = require_searcher(state).await?;
    let content = searcher
        .open_document(&request.path)
        .await
        .map_err(|e| e.to_string())?;

    let mut tree = RenderTree::from_markdown(&content);
    let highlighter = Highlighter::new(state.config().highlight.clone());
    let report = highlighter.highlight_term(&request.query, &mut tree);

    let mut output = format!(
        "Highlighted {} occurrence(s) of '{}' in `{}`",
        report.marks, request.query, request.path
    );
    if report.failed > 0 {
        let _ = write!(output, " ({} segment(s) skipped)", report.failed);
    }
    output.push_str(":\n\n");
    output.push_str(&tree.to_html());
    Ok(output)
}

//! Index maintenance: statistics, rebuilding and removal.

use super::require_searcher;
use crate::search::IndexStats;
use crate::state::ViewerState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveFromIndexRequest {
    /// Path of the document relative to the open folder
    pub path: String,
}

pub async fn handle_index_stats(state: &Arc<ViewerState>) -> Result<String, String> {
    let searcher = require_searcher(state).await?;
    Ok(format_stats(&searcher.index_stats().await))
}

/// Drops the index and indexes every document again.
pub async fn handle_reindex(state: &Arc<ViewerState>) -> Result<String, String> {
    let searcher = require_searcher(state).await?;
    searcher.clear_index().await;
    let indexed = searcher.index_all_files().await;
    Ok(format!(
        "Reindexed {} document(s).\n\n{}",
        indexed,
        format_stats(&searcher.index_stats().await)
    ))
}

pub async fn handle_remove_from_index(
    state: &Arc<ViewerState>,
    request: RemoveFromIndexRequest,
) -> Result<String, String> {
    let searcher = require_searcher(state).await?;
    if searcher.remove_from_index(&request.path).await {
        Ok(format!("Removed '{}' from the index.", request.path))
    } else {
        Ok(format!("'{}' was not indexed.", request.path))
    }
}

pub async fn handle_clear_index(state: &Arc<ViewerState>) -> Result<String, String> {
    let searcher = require_searcher(state).await?;
    searcher.clear_index().await;
    Ok("Index cleared.".to_string())
}

/// Human-readable index statistics.
pub fn format_stats(stats: &IndexStats) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Indexed documents: {}", stats.indexed_files);
    let _ = writeln!(output, "Total size: {} bytes", stats.total_size);
    let _ = writeln!(
        output,
        "Indexing: {}",
        if stats.is_indexing { "in progress" } else { "idle" }
    );
    match stats
        .last_update
        .and_then(|at| SystemTime::now().duration_since(at).ok())
    {
        Some(age) => {
            let _ = writeln!(output, "Last update: {}s ago", age.as_secs());
        }
        None => output.push_str("Last update: never\n"),
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_format_empty_stats() {
        let stats = IndexStats {
            indexed_files: 0,
            total_size: 0,
            is_indexing: false,
            last_update: None,
        };
        let output = format_stats(&stats);
        check!(output.contains("Indexed documents: 0"));
        check!(output.contains("Indexing: idle"));
        check!(output.contains("Last update: never"));
    }
}

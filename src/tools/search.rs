//! Full-text search over the open folder.

use super::require_searcher;
use crate::search::{SearchResult, SearchType};
use crate::state::ViewerState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchContentRequest {
    /// Search query. Wrap in double quotes for an exact phrase; several words
    /// find places where all of them appear close together.
    pub query: String,
    /// Maximum number of documents to return (default: the configured maximum)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Runs a debounced content search.
///
/// A call overtaken by a newer search while waiting out the debounce window
/// reports that it was superseded instead of returning results.
pub async fn handle_search_content(
    state: &Arc<ViewerState>,
    request: SearchContentRequest,
) -> Result<String, String> {
    let searcher = require_searcher(state).await?;

    let Some(mut results) = searcher
        .search_in_content(&request.query)
        .await
        .into_results()
    else {
        return Ok(format!(
            "Search for '{}' was superseded by a newer query.",
            request.query
        ));
    };

    if let Some(limit) = request.limit {
        results.truncate(limit);
    }

    if results.is_empty() {
        let mut msg = format!("No results found for '{}'.\n\n", request.query);
        msg.push_str("Search tips:\n");
        let _ = writeln!(
            msg,
            "• Queries need at least {} characters",
            searcher.config().min_search_length
        );
        msg.push_str("• Very short common words (e.g. 'de', 'o') are ignored\n");
        msg.push_str("• Multiple words must all appear near each other\n");
        msg.push_str("• Wrap the query in double quotes to match an exact phrase\n");
        return Ok(msg);
    }

    Ok(format_search_results(&results, &request.query))
}

/// Format search results into a readable string output.
pub fn format_search_results(results: &[SearchResult], query: &str) -> String {
    let search_type = results
        .first()
        .map_or(SearchType::Single, |result| result.search_type);
    let mut output = format!(
        "Search results for '{}' ({} search, {} document(s)):\n\n",
        query,
        search_type,
        results.len()
    );

    for (idx, result) in results.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. `{}` - {} match(es)",
            idx + 1,
            result.path,
            result.match_count
        );
        for found in &result.matches {
            let _ = write!(output, "   line {}: {}", found.line_number, found.context);
            if !found.terms_found.is_empty() {
                let _ = write!(output, " [{}]", found.terms_found.join(", "));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    output
}

//! Result ordering.

use super::SearchResult;

/// Orders results by match count (highest first) and keeps the top `max_results`.
///
/// The sort is stable, so documents with equal counts stay in index order.
/// That order carries no meaning beyond being deterministic.
pub fn rank(mut results: Vec<SearchResult>, max_results: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    results.truncate(max_results);
    results
}

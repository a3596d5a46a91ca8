pub mod files;
pub mod folder;
pub mod highlight;
pub mod index;
pub mod search;

pub use files::*;
pub use folder::*;
pub use highlight::*;
pub use index::*;
pub use search::*;

use crate::searcher::ContentSearcher;
use crate::state::ViewerState;
use std::sync::Arc;

/// The searcher for the open folder, or a message telling the caller to open one.
pub(crate) async fn require_searcher(
    state: &Arc<ViewerState>,
) -> Result<Arc<ContentSearcher>, String> {
    state.searcher().await.ok_or_else(|| {
        "No folder is open.\n\nUse open_folder with a path to a directory of Markdown files."
            .to_string()
    })
}

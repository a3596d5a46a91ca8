//! Content search for a folder of Markdown documents.
//!
//! Documents are normalized to plain text and kept in an in-memory
//! [`SearchIndex`]. Queries route to one of three finders (single term, exact
//! phrase, proximity) and results are ranked by match count.
//! [`ContentSearcher`] adds debouncing and batch indexing on top, and the
//! [`highlight`] module marks query terms inside a rendered document.

pub mod cli;
pub mod config;
pub mod error;
pub mod highlight;
pub mod provider;
pub mod search;
pub mod searcher;
pub mod server;
pub mod state;
pub mod tools;
pub mod tracing;

pub use config::{Config, HighlightConfig, SearchConfig};
pub use error::{ConfigError, HighlightError, ProviderError, Result};
pub use highlight::{Highlighter, RenderTree, SegmentProvider};
pub use provider::{DocumentProvider, DocumentTree, FsProvider, NodeKind, TreeNode};
pub use search::{IndexStats, IndexedDocument, Match, Query, SearchIndex, SearchResult, SearchType};
pub use searcher::{ContentSearcher, SearchOutcome};
pub use server::DocServer;
pub use state::ViewerState;

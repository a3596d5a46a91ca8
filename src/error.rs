//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for docview application code.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods at the binary and tool-handler edges.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when a document provider cannot produce a document's text.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No document exists at the requested path.
    #[error("Document not found: {path}")]
    NotFound { path: String },
    /// The path escapes the provider's root directory.
    #[error("Path '{path}' is outside the document root")]
    OutsideRoot { path: String },
    /// Reading the document failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned when loading or validating configuration fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Error raised while highlighting a single text segment.
///
/// These never abort a highlight pass; the segment is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Segment {0} no longer exists")]
    MissingSegment(usize),
    #[error("Segment {0} is detached from the tree")]
    DetachedSegment(usize),
    #[error("Node {0} is not a text segment")]
    NotText(usize),
}

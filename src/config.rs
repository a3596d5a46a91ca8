//! Search and highlight configuration.
//!
//! Every field has a default, so a config file only needs to name the values it
//! overrides:
//!
//! ```toml
//! [search]
//! context_length = 120
//! debounce_ms = 150
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "DOCVIEW_CONFIG";

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub highlight: HighlightConfig,
}

/// Tunables for indexing, matching and ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of documents in a result list
    pub max_results: usize,
    /// Characters of context captured before and after a match
    pub context_length: usize,
    /// Queries shorter than this never touch the index
    pub min_search_length: usize,
    /// Quiet period before a query runs; newer queries supersede older ones
    pub debounce_ms: u64,
    /// Maximum distance between a cluster's seed and its other terms
    pub proximity_distance: usize,
    /// Matches kept per document per search
    pub max_matches_per_document: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            context_length: 80,
            min_search_length: 2,
            debounce_ms: 300,
            proximity_distance: 200,
            max_matches_per_document: 10,
        }
    }
}

impl SearchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Rejects settings that would make every search return nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::Invalid("max_results must be at least 1".into()));
        }
        if self.max_matches_per_document == 0 {
            return Err(ConfigError::Invalid(
                "max_matches_per_document must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for inline highlighting of the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Queries shorter than this clear highlights without adding new ones
    pub min_query_length: usize,
    /// Text inside any ancestor with one of these tags is never highlighted
    pub excluded_tags: Vec<String>,
    /// Text inside any ancestor carrying one of these classes is never highlighted
    pub excluded_classes: Vec<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            excluded_tags: vec!["pre".into(), "code".into()],
            excluded_classes: vec!["hljs".into(), "mermaid".into(), "swagger-ui".into()],
        }
    }
}

impl Config {
    /// Parse and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, then `DOCVIEW_CONFIG`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        check!(config.search.max_results == 50);
        check!(config.search.context_length == 80);
        check!(config.search.min_search_length == 2);
        check!(config.search.debounce() == Duration::from_millis(300));
        check!(config.search.proximity_distance == 200);
        check!(config.search.max_matches_per_document == 10);
        check!(config.highlight.excluded_tags == ["pre", "code"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\ncontext_length = 120").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        check!(config.search.context_length == 120);
        check!(config.search.max_results == 50);
        check!(config.highlight == HighlightConfig::default());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmax_results = 0").unwrap();

        let_assert!(Err(ConfigError::Invalid(_)) = Config::from_file(file.path()));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search\ncontext_length = ").unwrap();

        let_assert!(Err(ConfigError::Parse { .. }) = Config::from_file(file.path()));
    }
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docview-mcp")]
#[command(about = "Content search over a folder of Markdown documents, served over MCP", long_about = None)]
pub struct Cli {
    /// TOML configuration file (falls back to $DOCVIEW_CONFIG)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Folder to open and index at startup
    pub folder: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn test_parses_config_and_folder() {
        let_assert!(Ok(cli) = Cli::try_parse_from(["docview-mcp", "-c", "docview.toml", "docs"]));
        check!(cli.config.as_deref() == Some(std::path::Path::new("docview.toml")));
        check!(cli.folder.as_deref() == Some("docs"));

        let_assert!(Ok(cli) = Cli::try_parse_from(["docview-mcp", "--config", "other.toml"]));
        check!(cli.config.is_some());
        check!(cli.folder.is_none());
    }

    #[test]
    fn test_rejects_unknown_flags_and_extra_folders() {
        check!(Cli::try_parse_from(["docview-mcp", "--verbose"]).is_err());
        check!(Cli::try_parse_from(["docview-mcp", "a", "b"]).is_err());
        check!(Cli::try_parse_from(["docview-mcp", "--config"]).is_err());
    }
}

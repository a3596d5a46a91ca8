use anyhow::Context;
use clap::Parser;
use docview::cli::Cli;
use docview::tools::folder::{OpenFolderRequest, handle_open_folder};
use docview::{Config, DocServer};
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interfere with the MCP protocol on stdout
    docview::tracing::init();

    let args = Cli::parse();
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing::info!("Starting docview-mcp MCP server");
    let server = DocServer::new(config);

    if let Some(path) = args.folder {
        match handle_open_folder(server.state(), OpenFolderRequest { path }).await {
            Ok(summary) => tracing::info!("{}", summary.trim_end()),
            Err(e) => tracing::warn!("Initial folder not opened: {}", e),
        }
    }

    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;

    Ok(())
}

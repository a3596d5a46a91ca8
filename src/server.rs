//! MCP server implementation.

use crate::config::Config;
use crate::state::ViewerState;
use crate::tools::files::{FindFilesRequest, handle_find_files};
use crate::tools::folder::{OpenFolderRequest, handle_open_folder};
use crate::tools::highlight::{HighlightDocumentRequest, handle_highlight_document};
use crate::tools::index::{
    RemoveFromIndexRequest, handle_clear_index, handle_index_stats, handle_reindex,
    handle_remove_from_index,
};
use crate::tools::search::{SearchContentRequest, handle_search_content};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::borrow::Cow;
use std::sync::Arc;

/// MCP server for searching a folder of Markdown documents
#[derive(Clone)]
pub struct DocServer {
    /// Open folder, its searcher and the configuration
    state: Arc<ViewerState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl DocServer {
    pub fn new(config: Config) -> Self {
        Self {
            state: Arc::new(ViewerState::new(config)),
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the shared state.
    pub const fn state(&self) -> &Arc<ViewerState> {
        &self.state
    }

    #[tool(
        description = "Open a folder of Markdown documents. Scans it for .md files, replaces any previously open folder and indexes every document for content search."
    )]
    async fn open_folder(
        &self,
        Parameters(request): Parameters<OpenFolderRequest>,
    ) -> std::result::Result<String, String> {
        handle_open_folder(&self.state, request).await
    }

    #[tool(
        description = "Search the content of the open folder's documents. A single word finds every occurrence; several words find places where all of them appear close together; a query in double quotes matches an exact phrase. Results are ranked by number of matches.",
        input_schema = inline_schema_for_type::<SearchContentRequest>()
    )]
    async fn search_content(
        &self,
        Parameters(request): Parameters<SearchContentRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_content(&self.state, request).await
    }

    #[tool(
        description = "Find documents and folders by name. Case-insensitive substring match on file and folder names."
    )]
    async fn find_files(
        &self,
        Parameters(request): Parameters<FindFilesRequest>,
    ) -> std::result::Result<String, String> {
        handle_find_files(&self.state, request).await
    }

    #[tool(description = "Show how many documents are indexed, their total size and whether indexing is running.")]
    async fn index_stats(&self) -> std::result::Result<String, String> {
        handle_index_stats(&self.state).await
    }

    #[tool(description = "Clear the index and index every document in the open folder again.")]
    async fn reindex(&self) -> std::result::Result<String, String> {
        handle_reindex(&self.state).await
    }

    #[tool(description = "Remove one document from the content index.")]
    async fn remove_from_index(
        &self,
        Parameters(request): Parameters<RemoveFromIndexRequest>,
    ) -> std::result::Result<String, String> {
        handle_remove_from_index(&self.state, request).await
    }

    #[tool(description = "Remove every document from the content index.")]
    async fn clear_index(&self) -> std::result::Result<String, String> {
        handle_clear_index(&self.state).await
    }

    #[tool(
        description = "Render a document as HTML with the query's terms wrapped in <mark> elements. Code blocks and diagrams are left untouched. Opening a document also indexes it."
    )]
    async fn highlight_document(
        &self,
        Parameters(request): Parameters<HighlightDocumentRequest>,
    ) -> std::result::Result<String, String> {
        handle_highlight_document(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for DocServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "docview: content search for a folder of Markdown documents. \
                 Start with open_folder, then use search_content to find text and \
                 highlight_document to view a document with the matches marked.",
            )
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

/// Generate an inline JSON schema for MCP tools
///
/// Sets `inline_subschemas = true` so nested types are written in place
/// instead of as `$ref` definitions.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        check!(expand_tilde("/docs") == "/docs");
        check!(expand_tilde("docs/~") == "docs/~");
    }

    #[test]
    fn test_inline_schema_lists_fields() {
        let schema = inline_schema_for_type::<SearchContentRequest>();
        let properties = schema.get("properties").and_then(|p| p.as_object());
        check!(properties.is_some_and(|p| p.contains_key("query") && p.contains_key("limit")));
    }
}

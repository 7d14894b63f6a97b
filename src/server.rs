//! MCP server exposing the documentation index tools.

use crate::state::IndexState;
use crate::tools::{
    ListPagesRequest, LoadIndexRequest, ReadSectionRequest, SearchRequest, ValidateRequest,
    handle_list_pages, handle_load_index, handle_read_section, handle_search, handle_validate,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for documentation search-index queries
#[derive(Clone)]
pub struct IndexServer {
    /// Shared index state (loaded indices, active index, config)
    state: Arc<IndexState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for IndexServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl IndexServer {
    pub fn new(state: Arc<IndexState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the shared IndexState.
    pub const fn state(&self) -> &Arc<IndexState> {
        &self.state
    }

    #[tool(
        description = "Load a documentation search index (search_index.js, or a built docs directory containing one) and make it the default for other tools. Reports record and page counts."
    )]
    async fn load_index(
        &self,
        Parameters(request): Parameters<LoadIndexRequest>,
    ) -> std::result::Result<String, String> {
        handle_load_index(&self.state, request).await
    }

    #[tool(
        description = "Search documentation records. Default mode is a case-insensitive substring match on section titles and prose, with title matches listed before prose matches in document order. Mode 'terms' ranks stemmed keyword matches instead. Optional category and page filters.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search_docs(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "List the pages of the loaded documentation with their section headings and anchors."
    )]
    async fn list_pages(
        &self,
        Parameters(request): Parameters<ListPagesRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_pages(&self.state, request).await
    }

    #[tool(
        description = "Read the prose of one section by its anchor (e.g. '#Usage'), optionally limited to a page. An empty anchor with a page title reads the page introduction."
    )]
    async fn read_section(
        &self,
        Parameters(request): Parameters<ReadSectionRequest>,
    ) -> std::result::Result<String, String> {
        handle_read_section(&self.state, request).await
    }

    #[tool(
        description = "Check the loaded index for malformed entries and anchors used twice on one page."
    )]
    async fn validate_index(
        &self,
        Parameters(request): Parameters<ValidateRequest>,
    ) -> std::result::Result<String, String> {
        handle_validate(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for IndexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "docindex-mcp: search a project's generated documentation. \
                 Use load_index with the path of search_index.js (or the built docs directory) \
                 unless one was configured, then search_docs, list_pages and read_section."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Inline subschemas render enums such as the search mode as plain choices
/// instead of `$ref` indirections.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => Arc::new(object),
        other => {
            tracing::error!("Schema serialization produced a non-object value: {:?}", other);
            Arc::new(JsonObject::new())
        }
    }
}

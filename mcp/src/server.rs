//! MCP server bridging the Salesforce toolset to RMCP transports.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use rig::completion::ToolDefinition;
use rig::tool::{ToolSet, ToolSetError};
use rmcp::service::RequestContext;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, Content, ErrorData, JsonObject, ListToolsResult,
        PaginatedRequestParams, Tool as McpTool,
    },
    RoleServer, ServerHandler,
};
use serde_json::Value;

use salesforce_client::SalesforceClient;

use crate::tools::build_toolset;

/// Errors raised while serving the tool endpoint.
pub type ServeError = Box<dyn std::error::Error + Send + Sync>;

/// MCP server handler serving the Salesforce toolset.
///
/// Tool definitions are computed once at construction; calls are dispatched
/// through the shared [`ToolSet`], so every transport session sees the same
/// ten tools backed by one org client.
#[derive(Clone)]
pub struct SalesforceMcpServer {
    tools: Arc<ToolSet>,
    /// The name advertised during the MCP handshake.
    pub name: String,
    /// Pre-computed tool definitions.
    pub tool_definitions: Vec<McpTool>,
}

impl SalesforceMcpServer {
    /// Build the server around one org client.
    ///
    /// # Errors
    ///
    /// Returns `ToolSetError` if fetching tool definitions fails.
    pub async fn new(client: SalesforceClient) -> Result<Self, ToolSetError> {
        let toolset = build_toolset(client);
        let definitions = toolset.get_tool_definitions().await?;
        let tool_definitions = definitions.into_iter().map(definition_to_mcp).collect();
        Ok(Self {
            tools: Arc::new(toolset),
            name: "Salesforce".to_string(),
            tool_definitions,
        })
    }

    /// Serve the MCP protocol over stdio.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to initialize or the connection
    /// is lost.
    pub async fn serve_stdio(self) -> Result<(), ServeError> {
        let (stdin, stdout) = rmcp::transport::io::stdio();
        let service = rmcp::ServiceExt::serve(self, (stdin, stdout)).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Axum router carrying the streamable-HTTP endpoint.
    ///
    /// The MCP service is mounted at `/mcp`; a `/health` route answers plain
    /// `OK` for liveness checks.
    #[must_use]
    pub fn http_router(self) -> Router {
        let session_manager = Arc::new(LocalSessionManager::default());
        let handler = self;
        let service = StreamableHttpService::new(
            move || Ok(handler.clone()),
            session_manager,
            StreamableHttpServerConfig::default(),
        );

        Router::new()
            .nest_service("/mcp", service)
            .route("/health", get(health_check))
    }

    /// Serve the MCP protocol over streamable HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    pub async fn serve_http(self, addr: SocketAddr) -> Result<(), ServeError> {
        tracing::info!(%addr, "Salesforce MCP server listening on http://{addr}/mcp");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.http_router()).await?;
        Ok(())
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Convert a Rig `ToolDefinition` into an MCP tool definition.
#[must_use]
pub fn definition_to_mcp(definition: ToolDefinition) -> McpTool {
    let input_schema = if let Value::Object(map) = definition.parameters {
        Arc::new(map)
    } else {
        Arc::new(JsonObject::new())
    };

    McpTool {
        name: Cow::Owned(definition.name.clone()),
        title: Some(definition.name),
        description: Some(Cow::Owned(definition.description)),
        input_schema,
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

impl ServerHandler for SalesforceMcpServer {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2024_11_05,
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: rmcp::model::Implementation {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "CRUD and query tools for one Salesforce org. Use the listing and describe \
                 tools to discover API names before querying or writing records."
                    .to_string(),
            ),
        }
    }

    async fn initialize(
        &self,
        _request: rmcp::model::InitializeRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<rmcp::model::InitializeResult, ErrorData> {
        Ok(self.get_info())
    }

    #[tracing::instrument(skip(self, _request, _context), fields(rpc.method = "list_tools"))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tool_definitions.clone(),
            next_cursor: None,
            meta: None,
        })
    }

    #[tracing::instrument(skip(self, request, _context), fields(rpc.method = "call_tool", tool.name = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        // Tools with no parameters may arrive without an arguments object.
        let args_str = request
            .arguments
            .as_ref()
            .map_or_else(|| "{}".to_string(), |a| Value::Object(a.clone()).to_string());

        tracing::debug!(tool_name = %request.name, "dispatching tool call");

        match self.tools.call(&request.name, args_str).await {
            Ok(output) => Ok(CallToolResult::success(vec![Content::text(output)])),
            Err(e) => {
                tracing::error!(tool_name = %request.name, error = %e, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

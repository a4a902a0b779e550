//! MCP client side: remote tools wrapped as Rig tools.
//!
//! The tool server owns the Salesforce logic; this module discovers its
//! tools over streamable HTTP and exposes each one to the agent as a
//! [`rig::tool::Tool`] that forwards the call across the wire.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use rmcp::model::{CallToolRequestParams, Tool as McpTool};
use rmcp::service::{Peer, RunningService};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use thiserror::Error;

use crate::error::AgentError;

/// Error type for remote tool invocations.
#[derive(Debug, Error)]
pub enum RemoteToolError {
    /// The MCP round trip failed.
    #[error("MCP tool call failed: {0}")]
    Transport(String),
}

/// Live connection to the tool server.
pub type McpConnection = RunningService<RoleClient, ()>;

/// Connect to a streamable-HTTP MCP endpoint, e.g. `http://127.0.0.1:7000/mcp`.
///
/// The returned connection must stay alive for as long as any tool cloned
/// from it is in use; dropping it closes the transport.
///
/// # Errors
///
/// Returns [`AgentError::Mcp`] if the handshake fails.
pub async fn connect(url: &str) -> Result<McpConnection, AgentError> {
    let transport = StreamableHttpClientTransport::from_uri(url.to_string());
    let service = ()
        .serve(transport)
        .await
        .map_err(|e| AgentError::Mcp(format!("connecting to {url}: {e}")))?;
    Ok(service)
}

/// Fetch the server's tools and wrap each as a Rig tool.
///
/// # Errors
///
/// Returns [`AgentError::Mcp`] if listing tools fails.
pub async fn discover_tools(connection: &McpConnection) -> Result<Vec<RemoteTool>, AgentError> {
    let listed = connection
        .list_tools(None)
        .await
        .map_err(|e| AgentError::Mcp(format!("listing tools: {e}")))?;

    Ok(listed
        .tools
        .into_iter()
        .map(|tool| RemoteTool::new(&tool, connection.peer().clone()))
        .collect())
}

/// One server-side tool, callable from the agent's tool loop.
#[derive(Clone)]
pub struct RemoteTool {
    definition: ToolDefinition,
    peer: Peer<RoleClient>,
}

impl RemoteTool {
    /// Wrap one advertised tool.
    #[must_use]
    pub fn new(tool: &McpTool, peer: Peer<RoleClient>) -> Self {
        let parameters = Value::Object((*tool.input_schema).clone());
        Self {
            definition: ToolDefinition {
                name: tool.name.to_string(),
                description: tool
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .to_string(),
                parameters,
            },
            peer,
        }
    }

    /// The tool's advertised definition.
    #[must_use]
    pub const fn tool_definition(&self) -> &ToolDefinition {
        &self.definition
    }
}

impl Tool for RemoteTool {
    const NAME: &'static str = "remote_mcp_tool";

    type Error = RemoteToolError;
    type Args = Value;
    type Output = String;

    fn name(&self) -> String {
        self.definition.name.clone()
    }

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        self.definition.clone()
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let arguments = match args {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(RemoteToolError::Transport(format!(
                    "expected an object argument, got {other}"
                )))
            }
        };

        tracing::debug!(tool = %self.definition.name, "forwarding tool call over MCP");

        let result = self
            .peer
            .call_tool(CallToolRequestParams {
                meta: None,
                task: None,
                name: self.definition.name.clone().into(),
                arguments,
            })
            .await
            .map_err(|e| RemoteToolError::Transport(e.to_string()))?;

        // Error results still carry the message as text; hand it to the
        // model as tool output so it can react, mirroring the server's
        // "message instead of failure" contract.
        let text = result
            .content
            .iter()
            .filter_map(|content| content.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text)
    }
}

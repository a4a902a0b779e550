use thiserror::Error;

/// Errors relating to the chat agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Failure connecting to or talking over the MCP endpoint.
    #[error("MCP error: {0}")]
    Mcp(String),

    /// Error from the LLM provider or the tool-calling loop.
    #[error("agent error: {0}")]
    Prompt(#[from] rig::completion::PromptError),

    /// A required environment variable is missing or empty.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

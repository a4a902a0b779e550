//! The Rig agent wrapping the LLM and the remote Salesforce tools.

use async_trait::async_trait;
use rig::agent::{Agent, PromptRequest};
use rig::client::CompletionClient;
use rig::completion::Message;
use rig::providers::openai;
use rig::tool::ToolDyn;

use crate::error::AgentError;
use crate::remote::RemoteTool;

/// Tuning knobs for the chat agent.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Completion token cap per LLM call.
    pub max_tokens: u64,
    /// Upper bound on tool-loop turns per chat message.
    pub max_turns: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1000,
            max_turns: 12,
        }
    }
}

/// Something that can answer one chat message given a session history.
///
/// The web layer talks to this seam so it can be exercised with a stub
/// backend in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Answer `message`, reading and extending `history` in place.
    async fn reply(
        &self,
        history: &mut Vec<Message>,
        message: &str,
    ) -> Result<String, AgentError>;
}

/// OpenAI-backed Salesforce assistant.
pub struct SalesforceAgent {
    agent: Agent<openai::responses_api::ResponsesCompletionModel>,
    max_turns: usize,
}

impl SalesforceAgent {
    /// Build the agent from a provider client, the rendered preamble and
    /// the tools discovered over MCP.
    #[must_use]
    pub fn build(
        client: &openai::Client,
        settings: &AgentSettings,
        preamble: &str,
        tools: Vec<RemoteTool>,
    ) -> Self {
        let tools: Vec<Box<dyn ToolDyn>> = tools
            .into_iter()
            .map(|tool| Box::new(tool) as Box<dyn ToolDyn>)
            .collect();
        let agent = client
            .agent(&settings.model)
            .preamble(preamble)
            .max_tokens(settings.max_tokens)
            .tools(tools)
            .build();
        Self {
            agent,
            max_turns: settings.max_turns,
        }
    }
}

#[async_trait]
impl ChatBackend for SalesforceAgent {
    async fn reply(
        &self,
        history: &mut Vec<Message>,
        message: &str,
    ) -> Result<String, AgentError> {
        let response = PromptRequest::new(&self.agent, message)
            .multi_turn(self.max_turns)
            .with_history(history)
            .await?;
        Ok(response)
    }
}

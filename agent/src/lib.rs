//! Salesforce chat agent.
//!
//! Connects to the Salesforce MCP tool server, wraps each remote tool as a
//! Rig tool, and drives an OpenAI agent through a bounded tool-calling loop
//! per chat message. A small axum app serves the single-page chat UI and
//! keeps an independent conversation history per session.

pub mod agent;
pub mod error;
pub mod prompt;
pub mod remote;
pub mod sessions;
pub mod web;

pub use agent::{AgentSettings, ChatBackend, SalesforceAgent};
pub use error::AgentError;
pub use sessions::SessionStore;
pub use web::AppState;

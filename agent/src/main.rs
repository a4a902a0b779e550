//! Binary entry point for the Salesforce chat agent.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use rig::client::ProviderClient;
use rig::providers::openai;

use salesforce_agent::agent::{AgentSettings, SalesforceAgent};
use salesforce_agent::web::{self, AppState};
use salesforce_agent::{prompt, remote, AgentError, SessionStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Streamable-HTTP endpoint of the Salesforce MCP tool server.
    #[arg(long, default_value = "http://127.0.0.1:7000/mcp")]
    mcp_url: String,

    /// Address to bind the chat UI to.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port for the chat UI.
    #[arg(long, default_value_t = 7001)]
    port: u16,

    /// OpenAI model to drive the agent with.
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Completion token cap per LLM call.
    #[arg(long, default_value_t = 1000)]
    max_tokens: u64,

    /// Upper bound on tool-loop turns per chat message.
    #[arg(long, default_value_t = 12)]
    max_turns: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if std::env::var("OPENAI_API_KEY").is_err() {
        return Err(AgentError::MissingConfig("OPENAI_API_KEY").into());
    }
    let openai_client = openai::Client::from_env();

    // The connection must outlive the server; the tools only hold peers.
    let connection = remote::connect(&cli.mcp_url).await?;
    let tools = remote::discover_tools(&connection).await?;
    anyhow::ensure!(!tools.is_empty(), "tool server at {} exposed no tools", cli.mcp_url);
    tracing::info!(count = tools.len(), url = %cli.mcp_url, "discovered Salesforce tools");

    let definitions: Vec<_> = tools
        .iter()
        .map(|tool| tool.tool_definition().clone())
        .collect();
    let preamble = prompt::render_preamble(&definitions);

    let settings = AgentSettings {
        model: cli.model,
        max_tokens: cli.max_tokens,
        max_turns: cli.max_turns,
    };
    let agent = SalesforceAgent::build(&openai_client, &settings, &preamble, tools);

    let state = AppState {
        backend: Arc::new(agent),
        sessions: SessionStore::new(),
    };
    let addr = SocketAddr::new(cli.host, cli.port);
    web::serve(state, addr).await?;

    drop(connection);
    Ok(())
}

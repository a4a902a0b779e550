//! Binary entry point for the Salesforce MCP tool server.

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, ValueEnum};

use salesforce_client::{SalesforceClient, SalesforceConfig};
use salesforce_mcp::SalesforceMcpServer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind the HTTP transport to.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port for the HTTP transport.
    #[arg(long, default_value_t = 7000)]
    port: u16,

    /// Transport to serve the tools over.
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    transport: Transport,
}

#[derive(Clone, Copy, ValueEnum)]
enum Transport {
    /// Streamable HTTP on `http://{host}:{port}/mcp`.
    Http,
    /// MCP over stdin/stdout.
    Stdio,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so the stdio transport keeps stdout for the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = SalesforceConfig::from_env()?;
    let client = SalesforceClient::new(config)?;

    let server = SalesforceMcpServer::new(client)
        .await
        .map_err(|e| anyhow::anyhow!("failed to build toolset: {e}"))?;

    tracing::info!(tools = server.tool_definitions.len(), "Salesforce toolset ready");

    match cli.transport {
        Transport::Http => {
            let addr = SocketAddr::new(cli.host, cli.port);
            server
                .serve_http(addr)
                .await
                .map_err(|e| anyhow::anyhow!("MCP server failed: {e}"))?;
        }
        Transport::Stdio => {
            server
                .serve_stdio()
                .await
                .map_err(|e| anyhow::anyhow!("MCP server failed: {e}"))?;
        }
    }

    Ok(())
}

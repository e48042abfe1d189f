use anyhow::{Context, Result};
use clap::Parser;
use elabftw_mcp::config::ElabConfig;
use elabftw_mcp::gateway::ElabClient;
use elabftw_mcp::server::ElabServer;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "elabftw-mcp")]
#[command(about = "MCP server for eLabFTW electronic lab notebooks", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the eLabFTW API (e.g. https://your-server.example.com/api/v2)
    #[arg(
        long,
        env = "ELABFTW_API_URL",
        default_value = "https://your-server.example.com/api/v2"
    )]
    api_url: String,

    /// eLabFTW API key. Without it only the guidance tool is servable.
    #[arg(long, env = "ELABFTW_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Verify TLS certificates ("true"/"false"). Off by default: lab
    /// instances commonly run with self-signed certificates.
    #[arg(long, env = "ELABFTW_VERIFY_SSL", default_value = "false")]
    verify_ssl: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let verify_ssl = cli.verify_ssl.eq_ignore_ascii_case("true");

    info!("Starting eLabFTW MCP server...");
    info!("API URL: {}", cli.api_url);
    info!("SSL verification: {}", verify_ssl);
    if cli.api_key.is_empty() {
        warn!("ELABFTW_API_KEY is not set! Please set it before using the server.");
    }

    let config = ElabConfig::new(cli.api_url, cli.api_key)
        .with_verify_ssl(verify_ssl)
        .with_request_timeout(Duration::from_secs(cli.timeout_secs));
    let client = ElabClient::new(config).context("failed to build eLabFTW client")?;
    let server = ElabServer::new(client);

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP stdio transport")?;
    service
        .waiting()
        .await
        .context("MCP service terminated abnormally")?;

    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the MCP stream; all diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

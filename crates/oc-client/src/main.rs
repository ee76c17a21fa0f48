//! oc-client: interactive annotation chat client
//!
//! Usage:
//!   oc-client [server_url]   - connect to a tool server (default: http://localhost:8000)
//!   oc-client --help         - show help

mod orchestrator;
mod shell;

use oc_core::{ClaudeClient, Config};
use oc_mcp::McpSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let address = parse_args();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    oc_core::logging::init_file(&config.client.log_file)
        .map_err(|e| anyhow::anyhow!("Logging error: {}", e))?;

    let address = address.unwrap_or_else(|| config.client.server_url.clone());

    let client = ClaudeClient::new(config.llm_config())
        .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;

    println!("oc-client");
    println!("Server: {}", address);

    // Connection and handshake failures are fatal to the whole run.
    let mut session = match McpSession::connect(&address).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            eprintln!("Fatal error: {}", e);
            std::process::exit(1);
        }
    };

    let result = run(&client, &session).await;

    // Release the session on every exit path, errors included.
    if let Err(e) = session.close().await {
        tracing::warn!("Error during session cleanup: {}", e);
    }

    if let Err(e) = &result {
        tracing::error!("Fatal error: {}", e);
    }
    result
}

/// Print the connected catalog, then hand over to the shell
async fn run(client: &ClaudeClient, session: &McpSession) -> anyhow::Result<()> {
    let tools = session.list_tools().await?;
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    println!("Connected. Tools: {:?}", names);

    shell::run_shell(client, session).await
}

/// Parse command line arguments.
///
/// Exits with a usage message when the address has no recognized scheme.
fn parse_args() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-v" => {
                println!("oc-client {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            _ => {}
        }
    }

    let address = args.get(1).cloned()?;

    if !(address.starts_with("http://") || address.starts_with("https://")) {
        eprintln!("Error: Server URL must start with http:// or https://");
        eprintln!("Usage: oc-client [server_url]");
        eprintln!("Example: oc-client http://localhost:8000");
        std::process::exit(1);
    }

    Some(address)
}

/// Print help message
fn print_help() {
    println!("oc-client - Variant annotation chat client");
    println!();
    println!("Usage:");
    println!("  oc-client [server_url]   Connect to a tool server");
    println!("                           (default: http://localhost:8000)");
    println!("  oc-client --help         Show this help message");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY        API key (required)");
    println!("  LLM_MODEL          Model name (default: claude-sonnet-4-20250514)");
    println!("  LLM_BASE_URL       Custom API endpoint");
    println!("  OC_SERVER_URL      Tool server address");
    println!("  OC_LOG_FILE        Log file path (default: app.log)");
}

//! oc-server: OpenCRAVAT annotation MCP tool server
//!
//! Usage:
//!   oc-server          - serve over stdio (request/reply)
//!   oc-server sse      - serve over SSE (persistent stream)
//!   oc-server --help   - show help

mod handler;

use std::sync::Arc;

use rmcp::{transport::sse_server::SseServer, ServiceExt};

use oc_core::{Config, ToolManager};
use oc_tools::register_annotation_tools;

use handler::AnnotatorService;

/// Transport selected on the command line
enum TransportMode {
    /// Persistent SSE stream
    Sse,
    /// Stdio request/reply (default)
    Stdio,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    match mode {
        TransportMode::Help => {
            print_help();
            return Ok(());
        }
        TransportMode::Version => {
            println!("oc-server {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    oc_core::logging::init_file(&config.server.log_file)
        .map_err(|e| anyhow::anyhow!("Logging error: {}", e))?;

    let mut manager = ToolManager::new();
    register_annotation_tools(&mut manager, &config.server.modules_dir);

    tracing::info!(
        "Registered {} annotation tools: {:?}",
        manager.len(),
        manager.tool_names()
    );

    let service = AnnotatorService::new(Arc::new(manager));

    match mode {
        TransportMode::Sse => run_sse(service, &config.server.bind_addr).await,
        _ => run_stdio(service).await,
    }
}

/// Parse command line arguments
fn parse_args() -> TransportMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return TransportMode::Help,
            "--version" | "-v" => return TransportMode::Version,
            "sse" => return TransportMode::Sse,
            _ => {}
        }
    }

    TransportMode::Stdio
}

/// Print help message
fn print_help() {
    println!("oc-server - OpenCRAVAT annotation MCP tool server");
    println!();
    println!("Usage:");
    println!("  oc-server          Serve tools over stdio");
    println!("  oc-server sse      Serve tools over SSE");
    println!("  oc-server --help   Show this help message");
    println!();
    println!("Environment Variables:");
    println!("  OC_BIND_ADDR       SSE bind address (default: 0.0.0.0:8000)");
    println!("  OC_MODULES_DIR     Installed annotator modules (default: modules)");
    println!("  OC_LOG_FILE        Log file path (default: tool.log)");
}

/// Serve over stdio until the peer disconnects
async fn run_stdio(service: AnnotatorService) -> anyhow::Result<()> {
    tracing::info!("Serving annotation tools over stdio");

    let running = service
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start stdio service: {}", e))?;

    running.waiting().await?;

    tracing::info!("stdio session ended");
    Ok(())
}

/// Serve over SSE until interrupted
async fn run_sse(service: AnnotatorService, bind_addr: &str) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind_addr, e))?;

    tracing::info!("Serving annotation tools over SSE on {}", addr);

    let cancel = SseServer::serve(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind SSE server: {}", e))?
        .with_service(move || service.clone());

    tracing::info!("Press Ctrl+C to exit");
    tokio::signal::ctrl_c().await?;

    cancel.cancel();
    tracing::info!("SSE server stopped");
    Ok(())
}

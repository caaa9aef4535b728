//! Telegram MCP Server - Main Entry Point
//!
//! Serves the `send_message` tool to an MCP host over stdin/stdout.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use telegram_mcp_server::config::TelegramConfig;
use telegram_mcp_server::mcp::{McpServer, ToolGateway};
use telegram_mcp_server::telegram::TelegramClient;

/// MCP server that sends messages to a Telegram chat.
#[derive(Parser, Debug)]
#[command(name = "telegram_mcp_server")]
#[command(about = "Send Telegram messages from MCP clients")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the advertised tool list as JSON and exit.
    #[arg(long)]
    print_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    if args.print_tools {
        return print_tools();
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let config = TelegramConfig::from_env()
        .inspect_err(|e| error!("Refusing to start: {}", e))
        .context("Failed to load Telegram configuration from environment")?;

    info!(
        "Loaded Telegram configuration (token: {}, chat: {})",
        config.masked_token(),
        config.chat_id
    );

    let server = McpServer::new(ToolGateway::new(TelegramClient::new(config)));

    server
        .run_stdio()
        .await
        .context("MCP server stopped with an I/O error")?;

    Ok(())
}

/// Initializes the logging subsystem.
///
/// Logs go to stderr; stdout carries the protocol stream.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints the tool descriptors that `tools/list` advertises.
fn print_tools() -> Result<()> {
    let tools = ToolGateway::list_tools();
    let json = serde_json::to_string_pretty(&serde_json::json!({ "tools": tools }))?;
    println!("{json}");
    Ok(())
}

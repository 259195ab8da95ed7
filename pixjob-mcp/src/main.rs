//! Pixjob MCP server binary.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pixjob_mcp::{Cli, ImageServer, ImageTools, ServerConfig};
use rmcp::{ServiceExt, transport::stdio};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging on stderr; stdout carries the protocol.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pixjob_mcp={level},pixjob={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(verbosity >= 2)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = ServerConfig::from_cli(&cli).context("invalid configuration")?;
    let tools = ImageTools::from_config(&config).context("failed to create job client")?;

    info!(
        base_url = config.client.base_url(),
        seedream = %config.seedream_endpoint_id,
        nano_banana = %config.nano_banana_endpoint_id,
        "starting MCP server on stdio"
    );

    let service = ImageServer::new(tools)
        .serve(stdio())
        .await
        .context("MCP handshake failed")?;
    service.waiting().await.context("MCP server stopped unexpectedly")?;

    info!("MCP server stopped");
    Ok(())
}

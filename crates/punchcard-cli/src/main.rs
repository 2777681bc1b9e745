//! Punchcard - a terminal client for the attendance and HR backend.
//!
//! Signs employees in, keeps the session between runs, and exposes every
//! backend function as a subcommand. Page commands are checked against the
//! same navigation rules the web front-end applies.

mod cli;
mod commands;
mod output;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use punchcard_core::{AppContext, Config};

use cli::Cli;

/// Directory for daily log files; unset means stderr only
const LOG_DIR_ENV: &str = "PUNCHCARD_LOG_DIR";

/// Log file name prefix inside the log directory
const LOG_FILE_PREFIX: &str = "punchcard.log";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    debug!(api = %config.api_base_url, "Configuration loaded");

    let mut ctx = AppContext::new(&config)?;
    ctx.start_watcher();

    let was_signed_in = ctx.store().is_authenticated();
    let result = commands::run(cli.command, &ctx, &config).await;
    if let Err(ref e) = result {
        if commands::is_unauthorized(e) {
            commands::settle_session(&ctx, was_signed_in).await;
        }
    }
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    info!("punchcard starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use monster_arena::config::Args;
use std::path::Path;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod client;
mod ui;

const LOG_FILE: &str = "monster-arena.log";

/// stdout belongs to the terminal UI, so logs go to a daily rolling file.
fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!(e))?;
    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = Args::parse().into_config()?;
    let _log_guard = init_tracing(&config.log_dir)?;
    tracing::info!(network = %config.network.url(), "starting monster-arena client");
    client::run_app(config).await
}

//! fileshare: command-line client for the fileshare service
//!
//! Restores the stored session, runs one command against the backend and
//! prints the result as JSON on stdout. Logs go to a file so stdout stays
//! machine-readable.

mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fileshare_core::{ApiClient, Config, FileStorage, SessionStore};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }),
    };

    let server_url = match &cli.url {
        Some(url) => url.clone(),
        None => config.server_url(cli.server.as_deref())?,
    };

    let storage_path = match &config.client.storage_path {
        Some(path) => path.clone(),
        None => FileStorage::default_path()?,
    };
    let storage = Arc::new(
        FileStorage::open(&storage_path)
            .with_context(|| format!("Failed to open session file {}", storage_path.display()))?,
    );

    tracing::info!("Server: {}", server_url);

    let client = ApiClient::with_prefix(&server_url, &config.client.api_prefix, storage)?;
    let store = SessionStore::new(client);
    store.restore()?;

    if let Err(e) = commands::run(&store, cli.command).await {
        tracing::error!("Command failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Send tracing output to `<cache_dir>/fileshare/fileshare.log`
fn init_logging() -> anyhow::Result<()> {
    let log_dir = dirs::cache_dir()
        .map(|d| d.join("fileshare"))
        .unwrap_or_else(|| std::env::temp_dir().join("fileshare"));

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "fileshare.log");

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fileshare_cli=info,fileshare_core=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false),
        )
        .init();

    Ok(())
}

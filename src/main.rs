//! EventPro API Server
//!
//! Run with: cargo run --bin eventpro
//!
//! # Configuration
//!
//! Read from `--config <file>` or the first of
//! `~/.config/eventpro/config.toml`, `/etc/eventpro/config.toml`,
//! `./config.toml`, then overridden by `EVENTPRO_*` environment variables
//! (`EVENTPRO_API_PORT`, `EVENTPRO_DATA_DIR`, `EVENTPRO_REMOTE_URL`,
//! `EVENTPRO_REMOTE_KEY`, `EVENTPRO_ADMIN_PASSWORD`, ...).
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use eventpro::admin::{AdminGate, DEFAULT_ADMIN_PASSWORD};
use eventpro::api::{serve, AppState};
use eventpro::config::{generate_default_config, Config};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "eventpro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Content server for the EventPro event site")]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::load_default(),
    };
    config.validate()?;

    eventpro::logging::init(&config.logging)?;

    tracing::info!("Starting EventPro server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.storage.data_path());

    if config.admin.password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("Admin password is the default; set EVENTPRO_ADMIN_PASSWORD");
    }

    let store = Arc::new(config.open_store()?);
    let status = store.status().await;

    match &status.remote {
        Some(remote) if remote.connected => {
            tracing::info!("Remote content store connected: {}", remote.location)
        }
        Some(remote) => tracing::warn!(
            "Remote content store not available: {} (serving local copy or defaults)",
            remote.error.as_deref().unwrap_or("unknown error")
        ),
        None => tracing::info!(
            "Remote content store disabled (set EVENTPRO_REMOTE_URL to enable); using local store only"
        ),
    }

    let mut watchers = Vec::new();
    if config.remote.poll_interval_secs > 0 {
        watchers.extend(
            store.start_remote_watch(Duration::from_secs(config.remote.poll_interval_secs)),
        );
    }
    if config.storage.watch_local {
        watchers.push(
            store.start_local_watch(Duration::from_millis(config.storage.watch_interval_ms)),
        );
    }

    let gate = AdminGate::new(&config.admin.password, config.admin.session_ttl());
    let state = AppState::new(Arc::clone(&store), gate, config.api.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await?;

    for watcher in watchers {
        watcher.abort();
    }
    tracing::info!("EventPro server stopped");

    Ok(())
}

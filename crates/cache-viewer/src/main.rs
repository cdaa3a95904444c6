//! Cache Viewer - local API over an application's image cache directory
//!
//! Lists the raw blob files another program drops into its cache directory
//! as images, streams them, and deletes or reveals them on request. Binds to
//! loopback only.

mod config;
mod error;
mod server;
mod types;

use crate::config::ViewerConfig;
use crate::error::Result;
use crate::server::{start_server, ServerState, SharedState};
use cache_dir::CacheDir;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("cache_viewer=info".parse()?);

    // Use JSON format for structured log collection when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Cache Viewer...");

    // Failing to locate the cache root is fatal
    let config = ViewerConfig::from_env()?;
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    match &config.assets_dir {
        Some(dir) => info!("Assets dir: {:?}", dir),
        None => info!("No ASSETS_DIR set, serving API only"),
    }

    if !config.cache_dir.is_dir() {
        warn!(cache_dir = ?config.cache_dir, "Cache directory does not exist yet");
    }

    let state: SharedState = Arc::new(ServerState::new(CacheDir::new(config.cache_dir)));

    start_server(state, config.port, config.assets_dir).await?;

    Ok(())
}

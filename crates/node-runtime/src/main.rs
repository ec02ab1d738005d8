//! # Kestrel-Chain Node Runtime
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `KC_*` environment variables
//! 2. Install the log subscriber
//! 3. Check the auth key is not the development default
//! 4. Start the runtime and wait for Ctrl+C

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("invalid log filter {:?}", config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    if let Err(e) = config.validate_for_production() {
        warn!("[node] {}", e);
    }

    info!("===========================================");
    info!("  Kestrel-Chain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let runtime = NodeRuntime::start(config).await?;

    info!("[node] Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await
}

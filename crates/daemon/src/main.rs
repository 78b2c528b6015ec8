// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `capsuled`: the capsule orchestrator daemon binary.

use std::path::PathBuf;

use capsule_daemon::{routes, startup, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CAPSULE_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));

    let config = Config::load(config_path);
    let result = startup(&config).await?;

    let executor = result.state.executor.clone();
    let app = routes::router(result.state);

    axum::serve(result.listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let removed = executor.volumes().cleanup_all();
    tracing::info!(removed, "cleaned up session volumes on shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install Ctrl+C handler, shutdown signal disabled");
    }
}

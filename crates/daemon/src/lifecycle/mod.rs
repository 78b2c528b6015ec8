// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration, startup, and the shared application
//! state handed to every route handler.

mod startup;
pub use startup::startup;


use std::path::PathBuf;
use std::sync::Arc;

use capsule_core::Registry;
use capsule_engine::CapsuleExecutor;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

/// Default bounded worker pool size (§5) when `CAPSULE_WORKERS` is unset.
const DEFAULT_WORKERS: usize = 10;

/// Daemon configuration resolved from CLI args / environment before startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the YAML registry document.
    pub config_path: PathBuf,
    /// Optional path to a static HTML file served at `GET /visualizer`.
    pub visualizer_path: Option<PathBuf>,
    /// Bounded worker pool size for `/execute`/`/handoff` dispatch (§5).
    pub workers: usize,
}

impl Config {
    /// Resolve configuration from environment variables, with
    /// `config_path` supplied explicitly by the caller (typically `capsulectl`).
    pub fn load(config_path: PathBuf) -> Self {
        let visualizer_path = std::env::var("CAPSULE_VISUALIZER_HTML").ok().map(PathBuf::from);
        let workers = std::env::var("CAPSULE_WORKERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_WORKERS);
        Self { config_path, visualizer_path, workers }
    }
}

/// Shared, process-wide state handed to every axum handler (§9 design note:
/// constructed once at startup, never re-initialized per request).
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub executor: Arc<CapsuleExecutor>,
    pub workers: Arc<Semaphore>,
    pub visualizer_path: Option<PathBuf>,
}

/// Everything `main` needs to begin serving.
pub struct StartupResult {
    pub state: AppState,
    pub listener: TcpListener,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("configuration error: {0}")]
    Config(#[from] capsule_core::error::ConfigError),

    #[error("failed to set up container network: {0}")]
    Network(#[from] capsule_adapters::ContainerDriverError),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, #[source] source: std::io::Error },
}

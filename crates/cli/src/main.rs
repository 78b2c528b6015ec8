// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `capsulectl`: operator CLI for the capsule orchestrator daemon.

use std::path::PathBuf;

use anyhow::{Context, Result};
use capsule_core::Registry;
use capsule_daemon::{routes, startup, Config};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "capsulectl", about = "Operate the capsule orchestrator daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and validate a registry config without starting the daemon.
    Validate {
        /// Path to the YAML registry document.
        config: PathBuf,
    },
    /// Print the registered capsules as JSON.
    Capsules {
        config: PathBuf,
    },
    /// Start the daemon in the foreground.
    Serve {
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { config } => validate(&config),
        Command::Capsules { config } => capsules(&config),
        Command::Serve { config } => serve(config).await,
    }
}

fn validate(config_path: &PathBuf) -> Result<()> {
    Registry::load(config_path).with_context(|| format!("config {} is invalid", config_path.display()))?;
    println!("{}: OK", config_path.display());
    Ok(())
}

fn capsules(config_path: &PathBuf) -> Result<()> {
    let registry = Registry::load(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let summary: std::collections::HashMap<_, _> = registry
        .capsules()
        .iter()
        .map(|(name, capsule)| (name.clone(), capsule.image.clone()))
        .collect();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn serve(config_path: PathBuf) -> Result<()> {
    let config = Config::load(config_path);
    let result = startup(&config).await.context("daemon startup failed")?;
    let app = routes::router(result.state);
    axum::serve(result.listener, app).await.context("daemon exited with an error")?;
    Ok(())
}

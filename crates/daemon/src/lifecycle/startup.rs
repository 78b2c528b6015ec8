// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup sequence (§4.9): load config, wire the engine, eagerly build
//! every registered capsule's image, and bind the listener. Nothing here
//! spawns the serve loop itself — that's `main`'s job, so tests can drive
//! `startup` without ever accepting a connection.

use std::sync::Arc;

use capsule_adapters::{ContainerDriver, DockerDriver};
use capsule_core::Registry;
use capsule_engine::{CapsuleExecutor, ExecutorDeps, FileManager, StateTracker, VolumeManager};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::{AppState, Config, LifecycleError, StartupResult};

pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Load config -> Registry.
    let registry = Arc::new(Registry::load(&config.config_path)?);

    // 2. Construct the container driver and ensure the shared network exists.
    let driver: Arc<dyn ContainerDriver> = Arc::new(DockerDriver::new());
    driver.ensure_network(&registry.docker().network).await?;

    // 3. VolumeManager / FileManager / StateTracker.
    let volumes = VolumeManager::new(registry.docker().base_path.clone());
    let files = FileManager::new(volumes.clone());
    let state = Arc::new(StateTracker::new());

    // 4. CapsuleExecutor, wired with every dependency above.
    let executor = Arc::new(CapsuleExecutor::new(ExecutorDeps {
        registry: Arc::clone(&registry),
        driver: Arc::clone(&driver),
        volumes,
        files,
        state,
    }));

    // 5. Eagerly build every registered capsule's image; a build failure is
    // a warning, not a startup abort, since the capsule may simply never be
    // invoked this run (§4.9).
    for (name, capsule) in registry.capsules() {
        match driver.image_exists(&capsule.image, "latest").await {
            Ok(true) => continue,
            _ => {
                if let Err(err) = driver.build(&capsule.image, &capsule.path, "latest").await {
                    warn!(capsule = %name, %err, "failed to eagerly build capsule image");
                }
            }
        }
    }

    // 6. Bounded worker pool (§5).
    let workers = Arc::new(Semaphore::new(config.workers));

    // 7. Bind last, only after all validation passes.
    let addr = format!("{}:{}", registry.server().host, registry.server().port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| LifecycleError::Bind { addr: addr.clone(), source })?;
    info!(%addr, capsules = registry.capsules().len(), "capsule orchestrator ready");

    Ok(StartupResult {
        state: AppState {
            registry,
            executor,
            workers,
            visualizer_path: config.visualizer_path.clone(),
        },
        listener,
    })
}

#[cfg(test)]
mod startup_tests;

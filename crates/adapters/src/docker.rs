// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker-CLI-backed [`ContainerDriver`].
//!
//! Shells out to `docker` via `tokio::process::Command` rather than binding
//! the Docker Engine API directly, matching this workspace's existing
//! adapter idiom of driving external runtimes through their CLI.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::driver::{ContainerDriver, ContainerDriverError, ContainerHandle, Mount};

/// Default implementation of [`ContainerDriver`] over the `docker` binary.
#[derive(Debug, Default, Clone)]
pub struct DockerDriver;

impl DockerDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContainerDriver for DockerDriver {
    async fn ensure_network(&self, name: &str) -> Result<(), ContainerDriverError> {
        let existing = run_docker(&["network", "ls", "--filter", &format!("name=^{name}$"), "-q"])
            .await
            .map_err(|reason| ContainerDriverError::NetworkSetup { network: name.to_string(), reason })?;

        if existing.trim().is_empty() {
            info!(network = %name, "creating docker network");
            run_docker(&["network", "create", "--driver", "bridge", name]).await.map_err(|reason| {
                ContainerDriverError::NetworkSetup { network: name.to_string(), reason }
            })?;
        } else {
            debug!(network = %name, "docker network already exists");
        }
        Ok(())
    }

    async fn build(
        &self,
        image: &str,
        context_path: &Path,
        tag: &str,
    ) -> Result<(), ContainerDriverError> {
        let full_image = format!("{image}:{tag}");
        let context = context_path.to_string_lossy().into_owned();
        info!(image = %full_image, context = %context, "building capsule image");
        run_docker(&["build", "--rm", "--force-rm", "-t", &full_image, &context])
            .await
            .map_err(|reason| ContainerDriverError::Build { image: full_image, reason })?;
        Ok(())
    }

    async fn image_exists(&self, image: &str, tag: &str) -> Result<bool, ContainerDriverError> {
        let full_image = format!("{image}:{tag}");
        match run_docker(&["image", "inspect", &full_image]).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    async fn run(
        &self,
        image: &str,
        tag: &str,
        network: &str,
        mounts: &[Mount],
        env: &[(String, String)],
        name: Option<&str>,
    ) -> Result<ContainerHandle, ContainerDriverError> {
        let full_image = format!("{image}:{tag}");
        let mut args: Vec<String> = vec!["run".to_string(), "-d".to_string(), "--network".to_string(), network.to_string()];

        if let Some(name) = name {
            args.push("--name".to_string());
            args.push(name.to_string());
        }

        for mount in mounts {
            args.push("-v".to_string());
            let mode = if mount.read_only { "ro" } else { "rw" };
            args.push(format!("{}:{}:{}", mount.host_path, mount.container_path, mode));
        }

        for (key, value) in env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }

        args.push(full_image.clone());

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let container_id = run_docker(&arg_refs)
            .await
            .map_err(ContainerDriverError::Run)?;

        info!(image = %full_image, container_id = %container_id, "container started");
        Ok(ContainerHandle(container_id.trim().to_string()))
    }

    async fn wait(
        &self,
        handle: &ContainerHandle,
        timeout: Duration,
    ) -> Result<Option<i32>, ContainerDriverError> {
        let wait_fut = run_docker(&["wait", &handle.0]);
        match tokio::time::timeout(timeout, wait_fut).await {
            Ok(Ok(stdout)) => {
                // `docker wait` prints the exit code as plain text, but
                // normalize defensively in case a future runtime returns a
                // structured record instead (§4.4 pitfall).
                let exit_code = stdout.trim().parse::<i32>().unwrap_or(-1);
                Ok(Some(exit_code))
            }
            Ok(Err(reason)) => Err(ContainerDriverError::Run(reason)),
            Err(_) => Ok(None),
        }
    }

    async fn logs(&self, handle: &ContainerHandle) -> Result<String, ContainerDriverError> {
        // The container's own stdout and stderr are two separate streams on
        // the `docker logs` process's own stdout/stderr; concatenate both so
        // a capsule that writes its failure to stderr still shows up here.
        match run_docker_logs(&handle.0).await {
            Ok(logs) => Ok(logs),
            Err(reason) => {
                warn!(container = %handle.0, %reason, "failed to fetch container logs");
                Ok(String::new())
            }
        }
    }

    async fn stop(&self, handle: &ContainerHandle, grace: Duration) -> Result<(), ContainerDriverError> {
        let secs = grace.as_secs().to_string();
        run_docker(&["stop", "-t", &secs, &handle.0]).await.map_err(ContainerDriverError::Other)?;
        Ok(())
    }

    async fn remove(&self, handle: &ContainerHandle, force: bool) -> Result<(), ContainerDriverError> {
        let mut args = vec!["rm"];
        if force {
            args.push("-f");
        }
        args.push(&handle.0);
        run_docker(&args).await.map_err(ContainerDriverError::Other)?;
        Ok(())
    }
}

/// Run a docker CLI command and return stdout on success.
async fn run_docker(args: &[&str]) -> Result<String, String> {
    let output = tokio::process::Command::new("docker")
        .args(args)
        .output()
        .await
        .map_err(|e| format!("failed to exec docker: {e}"))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("docker {} failed: {}", args.first().unwrap_or(&""), stderr.trim()))
    }
}

/// `docker logs <id>`, concatenating the container's stdout and stderr
/// streams (each arrives on the `docker logs` process's own stdout/stderr
/// respectively — they are never interleaved by the CLI itself).
async fn run_docker_logs(container_id: &str) -> Result<String, String> {
    let output = tokio::process::Command::new("docker")
        .args(["logs", container_id])
        .output()
        .await
        .map_err(|e| format!("failed to exec docker: {e}"))?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(format!("{stdout}{stderr}"))
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("docker logs failed: {}", stderr.trim()))
    }
}

#[cfg(test)]
mod docker_tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ContainerDriver` abstraction (§4.4).
//!
//! Every capsule run goes through this trait; the orchestrator never talks
//! to a container runtime directly. The only implementation shipped here
//! shells out to the `docker` CLI (see [`crate::DockerDriver`]), but the
//! trait is the seam a future Kubernetes or podman backend would plug into.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from container lifecycle operations.
#[derive(Debug, Error)]
pub enum ContainerDriverError {
    #[error("failed to ensure network '{network}': {reason}")]
    NetworkSetup { network: String, reason: String },

    #[error("image build failed for '{image}': {reason}")]
    Build { image: String, reason: String },

    #[error("container run failed: {0}")]
    Run(String),

    #[error("container did not finish within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("container operation failed: {0}")]
    Other(String),
}

/// A single bind mount, always `{host: <session-dir>, container: /io, rw}`
/// for a capsule invocation per §4.4.
#[derive(Debug, Clone)]
pub struct Mount {
    pub host_path: String,
    pub container_path: String,
    pub read_only: bool,
}

impl Mount {
    pub fn read_write(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self { host_path: host_path.into(), container_path: container_path.into(), read_only: false }
    }
}

/// Opaque handle to a running (or exited) container.
///
/// Callers must treat this as opaque — only the driver that produced it
/// knows how to resolve it back to a concrete container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle(pub String);

impl std::fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Abstract build/run/wait/logs/remove over a container runtime.
#[async_trait]
pub trait ContainerDriver: Send + Sync + 'static {
    /// Idempotently ensure the shared bridge network exists. All capsules
    /// run attached to this network so they can reach the orchestrator by
    /// hostname.
    async fn ensure_network(&self, name: &str) -> Result<(), ContainerDriverError>;

    /// Build `image:tag` from the `Dockerfile` in `context_path`.
    async fn build(
        &self,
        image: &str,
        context_path: &std::path::Path,
        tag: &str,
    ) -> Result<(), ContainerDriverError>;

    /// Whether `image:tag` is already present locally.
    async fn image_exists(&self, image: &str, tag: &str) -> Result<bool, ContainerDriverError>;

    /// Run `image:tag` attached to `network`, with the given mounts and
    /// environment, returning an opaque handle.
    async fn run(
        &self,
        image: &str,
        tag: &str,
        network: &str,
        mounts: &[Mount],
        env: &[(String, String)],
        name: Option<&str>,
    ) -> Result<ContainerHandle, ContainerDriverError>;

    /// Wait for the container to exit, normalizing whatever the underlying
    /// runtime returns (a record, in some runtimes) to a plain integer exit
    /// code. Returns `Ok(None)` on timeout rather than an error, so callers
    /// can distinguish "timed out" from "driver failed".
    async fn wait(
        &self,
        handle: &ContainerHandle,
        timeout: std::time::Duration,
    ) -> Result<Option<i32>, ContainerDriverError>;

    /// Full combined stdout+stderr.
    async fn logs(&self, handle: &ContainerHandle) -> Result<String, ContainerDriverError>;

    /// Stop the container, allowing `grace` before a hard kill.
    async fn stop(
        &self,
        handle: &ContainerHandle,
        grace: std::time::Duration,
    ) -> Result<(), ContainerDriverError>;

    /// Remove the container. `force` removes even if still running.
    async fn remove(&self, handle: &ContainerHandle, force: bool) -> Result<(), ContainerDriverError>;
}

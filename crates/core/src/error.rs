// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator's error taxonomy.
//!
//! Every variant here is reported inside a structured response envelope
//! (see [`crate::wire`]); none of these ever escape a request handler as an
//! HTTP error status. Only malformed requests and pre-initialization calls
//! use non-200 statuses at the RPC boundary.

use thiserror::Error;

/// Errors raised while loading or validating the orchestrator's configuration.
///
/// Fatal at startup only — a `ConfigError` aborts the daemon before it binds
/// a socket.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: serde_yaml::Error },

    #[error("capsule '{name}': {reason}")]
    InvalidCapsule { name: String, reason: String },

    #[error("llm.api_base is required but was not set")]
    MissingLlmApiBase,
}

/// Errors surfaced from a single `/execute` or `/handoff` call.
///
/// Every variant maps to a structured `{success: false, error, logs?}`
/// response; see §7 of the specification for the policy this enum encodes.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("capsule '{0}' not found in registry")]
    CapsuleNotFound(String),

    #[error("input validation failed: {0}")]
    InputSchemaInvalid(String),

    #[error("file operation failed: {0}")]
    FileOperation(String),

    #[error("failed to build container image for capsule '{capsule}': {reason}")]
    ContainerBuild { capsule: String, reason: String },

    #[error("container run failed: {0}")]
    ContainerRun(String),

    #[error("container execution timed out after {timeout_secs}s")]
    ContainerTimeout { timeout_secs: u64 },

    #[error("handoff to '{target}' failed: {reason}")]
    Handoff { target: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl OrchestratorError {
    /// A stable, user-facing error string for the response envelope.
    pub fn as_response_message(&self) -> String {
        self.to_string()
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP client this capsule uses to re-enter the orchestrator's RPC
//! surface (§4.10). This is the reentrancy the orchestrator's worker pool is
//! sized around: a running `/execute` call blocks here on another `/execute`.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use capsule_core::{ExecuteRequest, ExecuteResponse};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(3600);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to orchestrator failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A client bound to one orchestrator base URL, used for the lifetime of one
/// workflow invocation.
pub struct OrchestratorClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { base_url: base_url.into(), http }
    }

    /// Two-phase connectivity probe (§4.10 supplement): a raw TCP connect
    /// first, to fail fast without waiting on a full HTTP round trip, then an
    /// HTTP `GET /health`. A socket-level failure doesn't give up outright —
    /// the HTTP call is still attempted directly afterwards, so a transient
    /// low-level socket error never masks a reachable orchestrator.
    pub fn probe(&self) -> bool {
        match host_port(&self.base_url) {
            Some(hp) if !tcp_reachable(&hp) => {
                debug!(url = %self.base_url, "socket probe failed, falling back to a direct health check");
            }
            _ => {}
        }
        self.health_check()
    }

    fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).timeout(PROBE_TIMEOUT).send() {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!(%url, %err, "health check failed");
                false
            }
        }
    }

    /// `POST /execute` against the orchestrator, re-entering the same
    /// dispatch path that launched this capsule.
    pub fn execute(&self, capsule: &str, input: Value) -> Result<ExecuteResponse, ClientError> {
        let url = format!("{}/execute", self.base_url);
        let request = ExecuteRequest { capsule: capsule.to_string(), input, files: None };
        let response = self.http.post(&url).json(&request).send()?;
        Ok(response.json()?)
    }
}

/// Extract `host:port` from a `scheme://host:port[/path]` URL.
fn host_port(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    Some(without_scheme.split('/').next()?.to_string())
}

fn tcp_reachable(host_port: &str) -> bool {
    match host_port.to_socket_addrs() {
        Ok(mut addrs) => addrs.any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod client_tests;

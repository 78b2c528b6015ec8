// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response envelopes for the RPC surface (§6 of the specification).
//!
//! These types are shared between `capsule-daemon` (which serves them) and
//! `workflow-capsule` (which, as a capsule, is itself a client of `/execute`
//! and `/handoff`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /execute` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub capsule: String,
    pub input: Value,
    /// filename -> host source path, staged into the new session's `input/`.
    #[serde(default)]
    pub files: Option<HashMap<String, String>>,
}

/// Common result envelope for `/execute` and `/handoff`.
///
/// Partial success is not a concept: a capsule either produced a valid
/// `output.json` or the call failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Populated whenever a container actually ran, success or failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

impl ExecuteResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), ..Default::default() }
    }
}

/// `POST /handoff` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffRequest {
    pub session_id: String,
    pub target: String,
    pub args: Value,
}

/// `/handoff` response; the same shape as `ExecuteResponse` minus `session_id`
/// (a handoff's target session is never handed back to the caller — it is
/// destroyed before the response is observed, see §8 invariant 5).
pub type HandoffResponse = ExecuteResponse;

/// `GET /capsules` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapsuleSummary {
    pub path: String,
    pub image: String,
}

/// `GET /visualizer/state` node: one execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerNode {
    pub session: String,
    pub capsule: String,
    pub status: String,
    pub parent_session: Option<String>,
}

/// `GET /visualizer/state` edge: one handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerEdge {
    pub caller_session: String,
    pub caller_capsule: Option<String>,
    pub target_capsule: String,
    pub target_session: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerState {
    pub nodes: Vec<VisualizerNode>,
    pub edges: Vec<VisualizerEdge>,
    pub timestamp_ms: u64,
}

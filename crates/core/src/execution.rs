// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory execution records tracked by the `StateTracker`.

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Lifecycle status of one capsule invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

/// Runtime entity keyed by session id.
///
/// A handoff-spawned session carries `parent_session`, forming a forest of
/// executions rooted at top-level `/execute` calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub session: SessionId,
    pub capsule_name: String,
    pub start_time_ms: u64,
    pub status: ExecutionStatus,
    pub container_handle: Option<String>,
    pub parent_session: Option<SessionId>,
}

impl ExecutionRecord {
    pub fn new(
        session: SessionId,
        capsule_name: impl Into<String>,
        start_time_ms: u64,
        parent_session: Option<SessionId>,
    ) -> Self {
        Self {
            session,
            capsule_name: capsule_name.into(),
            start_time_ms,
            status: ExecutionStatus::Running,
            container_handle: None,
            parent_session,
        }
    }
}

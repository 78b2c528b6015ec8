// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! StateTracker (§4.6): the only shared mutable data structure in the
//! orchestrator, guarded by a single mutex. Holding time is limited to map
//! lookups/updates (§5 shared resource policy).

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use capsule_core::{ExecutionRecord, ExecutionStatus, HandoffEdge, SessionId};
use parking_lot::Mutex;

/// Bound on the handoff ring (§3).
const MAX_HANDOFFS: usize = 1000;

/// Retention window for terminal executions in a snapshot (§4.6).
const EXECUTION_RETENTION_SECS: u64 = 30;

/// Retention window for handoffs whose endpoints are no longer live (§4.6).
const HANDOFF_RETENTION_SECS: u64 = 60;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// A point-in-time view for `GET /visualizer/state`.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub nodes: Vec<ExecutionRecord>,
    pub edges: Vec<HandoffEdge>,
    pub now_ms: u64,
}

#[derive(Default)]
pub struct StateTracker {
    inner: Mutex<InnerState>,
}

#[derive(Default)]
struct InnerState {
    executions: HashMap<SessionId, ExecutionRecord>,
    handoffs: Vec<HandoffEdge>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_execution(
        &self,
        session: SessionId,
        capsule_name: &str,
        parent_session: Option<SessionId>,
    ) {
        let record = ExecutionRecord::new(session, capsule_name, now_ms(), parent_session);
        self.inner.lock().executions.insert(session, record);
    }

    /// Updates the execution's status. `container_handle`, when `Some`,
    /// overwrites the recorded handle; a `None` here means "no new handle",
    /// not "clear the existing one" (§4.6 supplement).
    pub fn update_status(
        &self,
        session: SessionId,
        status: ExecutionStatus,
        container_handle: Option<String>,
    ) {
        let mut inner = self.inner.lock();
        if let Some(record) = inner.executions.get_mut(&session) {
            record.status = status;
            if container_handle.is_some() {
                record.container_handle = container_handle;
            }
        }
    }

    pub fn register_handoff(&self, edge: HandoffEdge) {
        let mut inner = self.inner.lock();
        inner.handoffs.push(edge);
        if inner.handoffs.len() > MAX_HANDOFFS {
            let overflow = inner.handoffs.len() - MAX_HANDOFFS;
            inner.handoffs.drain(0..overflow);
        }
    }

    /// Resolve the capsule name that owns `session`, for handoff edge
    /// attribution. Returns `None` if the session is unknown — callers
    /// should proceed with degraded attribution rather than fail (§4.8
    /// step 5).
    pub fn capsule_name(&self, session: SessionId) -> Option<String> {
        self.inner.lock().executions.get(&session).map(|r| r.capsule_name.clone())
    }

    /// Retention policy: include any execution whose status is `running`,
    /// or whose terminal age is within `EXECUTION_RETENTION_SECS`; include
    /// any handoff whose age is within `HANDOFF_RETENTION_SECS` or whose
    /// endpoints are still live.
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.lock();
        let now = now_ms();

        let live_sessions: std::collections::HashSet<SessionId> = inner
            .executions
            .values()
            .filter(|r| !r.status.is_terminal())
            .map(|r| r.session)
            .collect();

        let nodes: Vec<ExecutionRecord> = inner
            .executions
            .values()
            .filter(|r| {
                !r.status.is_terminal()
                    || age_secs(now, r.start_time_ms) <= EXECUTION_RETENTION_SECS
            })
            .cloned()
            .collect();

        let edges: Vec<HandoffEdge> = inner
            .handoffs
            .iter()
            .filter(|edge| {
                age_secs(now, edge.timestamp_ms) <= HANDOFF_RETENTION_SECS
                    || live_sessions.contains(&edge.caller_session)
                    || live_sessions.contains(&edge.target_session)
            })
            .cloned()
            .collect();

        StateSnapshot { nodes, edges, now_ms: now }
    }
}

fn age_secs(now_ms: u64, then_ms: u64) -> u64 {
    now_ms.saturating_sub(then_ms) / 1000
}

#[cfg(test)]
mod state_tests;

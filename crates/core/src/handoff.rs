// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff edges: the append-only observability log of capsule-to-capsule calls.

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// One completed handoff, as recorded for the `/visualizer/state` surface.
///
/// The `StateTracker` retains these in a bounded ring of the most recent
/// `N` (default 1000); see `capsule-engine::state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffEdge {
    pub caller_session: SessionId,
    pub caller_capsule: Option<String>,
    pub target_capsule: String,
    pub target_session: SessionId,
    pub timestamp_ms: u64,
    pub success: bool,
}

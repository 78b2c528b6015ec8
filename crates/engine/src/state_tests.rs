// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use capsule_core::SessionId;

use super::*;

#[test]
fn running_execution_is_always_in_the_snapshot() {
    let tracker = StateTracker::new();
    let session = SessionId::new();
    tracker.register_execution(session, "echo", None);

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.nodes.len(), 1);
    assert_eq!(snapshot.nodes[0].status, ExecutionStatus::Running);
}

#[test]
fn status_update_does_not_clobber_an_existing_handle_with_none() {
    let tracker = StateTracker::new();
    let session = SessionId::new();
    tracker.register_execution(session, "echo", None);
    tracker.update_status(session, ExecutionStatus::Running, Some("container-1".to_string()));
    tracker.update_status(session, ExecutionStatus::Completed, None);

    let snapshot = tracker.snapshot();
    let record = snapshot.nodes.iter().find(|r| r.session == session).unwrap();
    assert_eq!(record.container_handle.as_deref(), Some("container-1"));
    assert_eq!(record.status, ExecutionStatus::Completed);
}

#[test]
fn handoff_ring_is_bounded_to_most_recent_entries() {
    let tracker = StateTracker::new();
    for i in 0..(MAX_HANDOFFS + 10) {
        tracker.register_handoff(HandoffEdge {
            caller_session: SessionId::new(),
            caller_capsule: Some(format!("capsule-{i}")),
            target_capsule: "target".to_string(),
            target_session: SessionId::new(),
            timestamp_ms: i as u64,
            success: true,
        });
    }
    let inner = tracker.inner.lock();
    assert_eq!(inner.handoffs.len(), MAX_HANDOFFS);
    // the oldest entries were dropped from the front
    assert_eq!(inner.handoffs.first().unwrap().timestamp_ms, 10);
}

#[test]
fn capsule_name_resolves_for_known_session_and_none_otherwise() {
    let tracker = StateTracker::new();
    let session = SessionId::new();
    tracker.register_execution(session, "producer", None);

    assert_eq!(tracker.capsule_name(session).as_deref(), Some("producer"));
    assert_eq!(tracker.capsule_name(SessionId::new()), None);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HandoffHandler (§4.8): lets a running capsule delegate a sub-task to
//! another capsule without the caller ever talking to Docker directly.
//!
//! A handoff mints its own session, runs through the same
//! [`CapsuleExecutor`] as a top-level `/execute`, and is torn down the same
//! way — only the callee's session tree is destroyed; the caller's lifecycle
//! is untouched (§4.8 step 10, resolving the open question of whether a
//! handoff should also affect the caller: it does not).

use std::time::{SystemTime, UNIX_EPOCH};

use capsule_core::{HandoffEdge, HandoffRequest, HandoffResponse, SessionId};
use serde_json::Value;
use tracing::warn;

use crate::executor::CapsuleExecutor;
use crate::files::FileManager;
use crate::state::StateTracker;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

pub struct HandoffHandler<'a> {
    executor: &'a CapsuleExecutor,
}

impl<'a> HandoffHandler<'a> {
    pub fn new(executor: &'a CapsuleExecutor) -> Self {
        Self { executor }
    }

    fn files(&self) -> &FileManager {
        self.executor.files()
    }

    fn state(&self) -> &StateTracker {
        self.executor.state()
    }

    /// Resolve, stage, run, and reconcile one handoff end to end.
    pub async fn handle(&self, request: HandoffRequest) -> HandoffResponse {
        let caller_session: SessionId = match request.session_id.parse() {
            Ok(id) => id,
            Err(_) => return HandoffResponse::failure("invalid session_id"),
        };

        // Step 1: attribute the edge to the caller's capsule, if still known.
        let caller_capsule = self.state().capsule_name(caller_session);

        // Step 2-3: mint the callee's session and stage any file the
        // caller already placed in its handoff/outgoing/ into it.
        let target_session = SessionId::new();
        let args = request.args;
        if let Err(reason) = self.stage_referenced_files(&args, caller_session, target_session) {
            return HandoffResponse::failure(format!("failed to stage handoff files: {reason}"));
        }

        // Step 4-5: run the target capsule in the callee session.
        let response = self
            .executor
            .execute(&request.target, args, None, Some(target_session), Some(caller_session))
            .await;

        // Step 6: reflect every output file back into the caller's
        // handoff/incoming/ so the caller can read it after the handoff
        // returns (its own session tree is still alive).
        if response.success {
            if let Some(files) = &response.files {
                for name in files {
                    if let Err(err) =
                        self.files().copy_output_to_incoming(target_session, caller_session, name)
                    {
                        warn!(%caller_session, %target_session, file = %name, %err, "failed to reflect handoff output file");
                    }
                }
            }
        }

        // Step 7: record the edge regardless of outcome.
        self.state().register_handoff(HandoffEdge {
            caller_session,
            caller_capsule,
            target_capsule: request.target.clone(),
            target_session,
            timestamp_ms: now_ms(),
            success: response.success,
        });

        // Step 8: the callee's session id is never handed back to the caller.
        let mut response = response;
        response.session_id = None;
        response
    }

    /// Copy into the callee's `input/` every file the caller has already
    /// written to `handoff/outgoing/` and that `args` names by basename
    /// (§4.8 step 2-3). File references remain plain basenames in `args` —
    /// the callee resolves them under its own `/io/input/` the same way any
    /// top-level `/execute` input file is resolved; this handler never
    /// rewrites the value.
    fn stage_referenced_files(
        &self,
        args: &Value,
        caller_session: SessionId,
        target_session: SessionId,
    ) -> std::io::Result<()> {
        let Some(obj) = args.as_object() else {
            return Ok(());
        };

        let candidates: Vec<String> =
            obj.values().filter_map(|value| value.as_str().map(str::to_string)).collect();

        for name in candidates {
            if self.files().exists_in_outgoing(caller_session, &name) {
                self.files().copy_outgoing_to_input(caller_session, target_session, &name)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod handoff_tests;

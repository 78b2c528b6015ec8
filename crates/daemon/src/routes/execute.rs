// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /execute` (§4.9): synchronous capsule invocation.

use axum::extract::State;
use axum::Json;
use capsule_core::{ExecuteRequest, ExecuteResponse};
use tracing::info;

use crate::lifecycle::AppState;

/// Every call is dispatched through the bounded worker pool (§5): a request
/// that arrives while all permits are held waits here rather than being
/// rejected, since the only way a permit becomes available sooner is one of
/// the in-flight calls finishing.
pub async fn post_execute(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Json<ExecuteResponse> {
    let _permit = match state.workers.acquire().await {
        Ok(permit) => permit,
        Err(_) => return Json(ExecuteResponse::failure("worker pool is shutting down")),
    };
    info!(capsule = %request.capsule, "dispatching /execute");
    let response = state
        .executor
        .execute(&request.capsule, request.input, request.files, None, None)
        .await;
    Json(response)
}

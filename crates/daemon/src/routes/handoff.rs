// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /handoff` (§4.9, §4.8): lets a running capsule delegate to another.

use axum::extract::State;
use axum::Json;
use capsule_core::{HandoffRequest, HandoffResponse};
use capsule_engine::HandoffHandler;
use tracing::info;

use crate::lifecycle::AppState;

pub async fn post_handoff(
    State(state): State<AppState>,
    Json(request): Json<HandoffRequest>,
) -> Json<HandoffResponse> {
    let _permit = match state.workers.acquire().await {
        Ok(permit) => permit,
        Err(_) => return Json(HandoffResponse::failure("worker pool is shutting down")),
    };
    info!(target = %request.target, "dispatching /handoff");
    let handler = HandoffHandler::new(&state.executor);
    Json(handler.handle(request).await)
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /visualizer/state` and `GET /visualizer` (§4.9).
//!
//! The visualizer's HTML *content* is explicitly out of scope (§1); this
//! module only serves whatever file an operator points
//! `CAPSULE_VISUALIZER_HTML` at, if any.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use capsule_core::{VisualizerEdge, VisualizerNode, VisualizerState};

use crate::lifecycle::AppState;

pub async fn get_state(State(state): State<AppState>) -> Json<VisualizerState> {
    let snapshot = state.executor.state().snapshot();

    let nodes = snapshot
        .nodes
        .into_iter()
        .map(|record| VisualizerNode {
            session: record.session.to_string(),
            capsule: record.capsule_name,
            status: format!("{:?}", record.status).to_lowercase(),
            parent_session: record.parent_session.map(|s| s.to_string()),
        })
        .collect();

    let edges = snapshot
        .edges
        .into_iter()
        .map(|edge| VisualizerEdge {
            caller_session: edge.caller_session.to_string(),
            caller_capsule: edge.caller_capsule,
            target_capsule: edge.target_capsule,
            target_session: edge.target_session.to_string(),
            success: edge.success,
        })
        .collect();

    Json(VisualizerState { nodes, edges, timestamp_ms: snapshot.now_ms })
}

pub async fn get_html(State(state): State<AppState>) -> Response {
    let Some(path) = &state.visualizer_path else {
        return (StatusCode::NOT_FOUND, "no visualizer HTML configured").into_response();
    };
    match std::fs::read_to_string(path) {
        Ok(html) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "visualizer HTML not found").into_response(),
    }
}

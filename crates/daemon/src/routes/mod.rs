// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The RPC surface (§4.9/§6): `axum` handlers wired onto [`AppState`].

mod capsules;
mod execute;
mod handoff;
mod health;
mod visualizer;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::lifecycle::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/execute", post(execute::post_execute))
        .route("/handoff", post(handoff::post_handoff))
        .route("/capsules", get(capsules::list_capsules))
        .route("/capsules/:name/schema", get(capsules::get_schema))
        .route("/visualizer/state", get(visualizer::get_state))
        .route("/visualizer", get(visualizer::get_html))
        .route("/health", get(health::get_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

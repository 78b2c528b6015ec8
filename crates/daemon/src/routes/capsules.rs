// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /capsules` and `GET /capsules/{name}/schema` (§4.9, §3.1).

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use capsule_core::CapsuleSummary;
use serde_json::{json, Value};

use crate::lifecycle::AppState;

/// `{capsules: {name: {path, image}}}` — nested under a top-level key, not a
/// bare map (§3.1 wire detail recovered from the original implementation).
pub async fn list_capsules(State(state): State<AppState>) -> Json<Value> {
    let capsules: HashMap<String, CapsuleSummary> = state
        .registry
        .capsules()
        .iter()
        .map(|(name, capsule)| {
            let summary = CapsuleSummary {
                path: capsule.path.to_string_lossy().into_owned(),
                image: capsule.image.clone(),
            };
            (name.clone(), summary)
        })
        .collect();
    Json(json!({ "capsules": capsules }))
}

pub async fn get_schema(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(capsule) = state.registry.capsule(&name) else {
        return (StatusCode::NOT_FOUND, format!("capsule '{name}' not found")).into_response();
    };

    let schema_path = capsule.schema_path();
    match std::fs::read_to_string(&schema_path) {
        Ok(text) => match serde_json::from_str::<Value>(&text) {
            Ok(document) => Json(document).into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "schema.json is not valid JSON").into_response(),
        },
        Err(_) => (StatusCode::NOT_FOUND, format!("capsule '{name}' has no schema.json")).into_response(),
    }
}

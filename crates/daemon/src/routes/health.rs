// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /health` (§4.9): liveness only, no dependency checks.

use axum::http::StatusCode;

pub async fn get_health() -> StatusCode {
    StatusCode::OK
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::*;

#[test]
fn step_failure_reports_how_far_the_pipeline_got() {
    let report = step_failure(1, "consumer", vec![json!({"step_index": 0, "success": true})], "boom".to_string());
    assert_eq!(report["success"], json!(false));
    assert_eq!(report["steps_executed"], json!(2));
    assert_eq!(report["error"], json!("step 1 (consumer) failed: boom"));
    assert_eq!(report["step_results"].as_array().unwrap().len(), 2);
}

#[test]
fn failure_report_has_zero_steps_executed() {
    let report = failure_report("unreachable".to_string());
    assert_eq!(report["success"], json!(false));
    assert_eq!(report["steps_executed"], json!(0));
    assert_eq!(report["step_results"], json!([]));
}

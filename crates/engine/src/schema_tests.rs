// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::*;

fn write_schema(dir: &Path, document: &Value) {
    std::fs::write(dir.join("schema.json"), serde_json::to_vec(document).unwrap()).unwrap();
}

#[test]
fn missing_schema_file_skips_all_validation() {
    let dir = tempfile::tempdir().unwrap();
    let validator = SchemaValidator::load(dir.path()).unwrap();
    assert!(validator.validate_input(&json!({"anything": true})).is_ok());
    assert!(validator.validate_output(&json!({"anything": true})).is_ok());
}

#[test]
fn missing_side_in_schema_document_is_unchecked() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(
        dir.path(),
        &json!({"input": {"type": "object", "required": ["q"]}}),
    );
    let validator = SchemaValidator::load(dir.path()).unwrap();
    assert!(validator.validate_input(&json!({})).is_err());
    // no output side declared: anything passes
    assert!(validator.validate_output(&json!("whatever")).is_ok());
}

#[test]
fn input_violation_reports_the_missing_field() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(
        dir.path(),
        &json!({"input": {"type": "object", "required": ["q"]}}),
    );
    let validator = SchemaValidator::load(dir.path()).unwrap();
    let err = validator.validate_input(&json!({})).unwrap_err();
    assert!(err.contains('q'));
}

#[test]
fn valid_payload_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(
        dir.path(),
        &json!({"input": {"type": "object", "required": ["q"]}}),
    );
    let validator = SchemaValidator::load(dir.path()).unwrap();
    assert!(validator.validate_input(&json!({"q": "hi"})).is_ok());
}

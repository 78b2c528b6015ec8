// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SchemaValidator (§4.3): validates a capsule's request/response JSON
//! against its declared `schema.json`. Input violations are fatal; output
//! violations are logged warnings only (§9 design note on output-schema
//! leniency).

use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::warn;

/// A capsule's compiled `{input, output}` schema pair.
///
/// Compiled lazily the first time a capsule is invoked and cached for the
/// lifetime of the orchestrator run (§4.3 supplement). Either side may be
/// absent from `schema.json`, in which case that side is unchecked.
pub struct SchemaValidator {
    input: Option<JSONSchema>,
    output: Option<JSONSchema>,
}

impl SchemaValidator {
    /// Load and compile `schema.json` from a capsule's build context.
    ///
    /// A missing `schema.json` file is treated the same as a document with
    /// both sides absent — nothing is validated, not an error.
    pub fn load(capsule_path: &Path) -> Result<Self, String> {
        let schema_path = capsule_path.join("schema.json");
        if !schema_path.exists() {
            return Ok(Self { input: None, output: None });
        }

        let text = std::fs::read_to_string(&schema_path)
            .map_err(|e| format!("failed to read {}: {e}", schema_path.display()))?;
        let document: Value = serde_json::from_str(&text)
            .map_err(|e| format!("failed to parse {}: {e}", schema_path.display()))?;

        let input = compile_side(&document, "input")?;
        let output = compile_side(&document, "output")?;
        Ok(Self { input, output })
    }

    /// Strict and fatal: returns `Err(detail)` describing the first
    /// violation.
    pub fn validate_input(&self, payload: &Value) -> Result<(), String> {
        match &self.input {
            Some(schema) => validate(schema, payload),
            None => Ok(()),
        }
    }

    /// Strict but non-fatal: a violation is returned for the caller to log
    /// as a warning; the payload is still returned to the original caller
    /// regardless (§4.3, §7).
    pub fn validate_output(&self, payload: &Value) -> Result<(), String> {
        match &self.output {
            Some(schema) => validate(schema, payload),
            None => Ok(()),
        }
    }
}

fn compile_side(document: &Value, side: &str) -> Result<Option<JSONSchema>, String> {
    let Some(schema_value) = document.get(side) else {
        return Ok(None);
    };
    JSONSchema::compile(schema_value)
        .map(Some)
        .map_err(|e| format!("invalid {side} schema: {e}"))
}

fn validate(schema: &JSONSchema, payload: &Value) -> Result<(), String> {
    match schema.validate(payload) {
        Ok(()) => Ok(()),
        Err(errors) => {
            let detail = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
            warn!(%detail, "schema validation failed");
            Err(detail)
        }
    }
}

#[cfg(test)]
mod schema_tests;

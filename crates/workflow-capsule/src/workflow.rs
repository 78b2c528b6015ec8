// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow document (§4.10): `{steps: [{capsule, translator?,
//! translator_instructions?}]}`, loaded either inline as a JSON string or
//! from a file resolved relative to `/io/input/`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct Workflow {
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    pub capsule: String,
    #[serde(default)]
    pub translator: Option<String>,
    #[serde(default)]
    pub translator_instructions: Option<TranslatorInstructions>,
}

#[derive(Debug, Deserialize)]
pub struct TranslatorInstructions {
    pub target_capsule: String,
    #[serde(default)]
    pub mapping: Option<Value>,
    #[serde(default)]
    pub instructions: Option<Value>,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("either 'workflow' or 'workflow_file' must be provided")]
    MissingWorkflow,

    #[error("invalid workflow document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to read workflow_file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("workflow must have at least one step")]
    EmptySteps,

    #[error("step {0} has a translator but no translator_instructions.target_capsule")]
    InvalidTranslator(usize),
}

impl Workflow {
    /// Load from `input.workflow` (a JSON string) or `input.workflow_file`
    /// (a path, resolved relative to `/io/input/` when not absolute).
    pub fn load(input: &Value) -> Result<Self, WorkflowError> {
        if let Some(raw) = input.get("workflow").and_then(Value::as_str) {
            let workflow: Workflow = serde_json::from_str(raw)?;
            workflow.validate()?;
            return Ok(workflow);
        }

        if let Some(raw_path) = input.get("workflow_file").and_then(Value::as_str) {
            let resolved = resolve_under_input(raw_path);
            let text = std::fs::read_to_string(&resolved)
                .map_err(|source| WorkflowError::Read { path: resolved.display().to_string(), source })?;
            let workflow: Workflow = serde_json::from_str(&text)?;
            workflow.validate()?;
            return Ok(workflow);
        }

        Err(WorkflowError::MissingWorkflow)
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        if self.steps.is_empty() {
            return Err(WorkflowError::EmptySteps);
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.translator.is_some() && step.translator_instructions.is_none() {
                return Err(WorkflowError::InvalidTranslator(index));
            }
        }
        Ok(())
    }
}

fn resolve_under_input(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new("/io/input").join(path)
    }
}

#[cfg(test)]
mod workflow_tests;

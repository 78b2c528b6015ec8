// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `workflow-capsule`: the meta-capsule that drives a sequential pipeline of
//! other capsules by re-entering the orchestrator's `/execute` RPC (§4.10).
//!
//! Like any capsule, this binary reads `/io/input.json`, writes
//! `/io/output.json`, and exits 0 or non-zero per the container contract
//! (§6). A failed *workflow step* is not a failed *capsule run*: it is
//! reported structurally in `output.json` with `success: false` and a
//! `step_results` trail, exactly like any other capsule's logical failure.

mod client;
mod workflow;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use client::OrchestratorClient;
use workflow::Workflow;

const INPUT_PATH: &str = "/io/input.json";
const OUTPUT_PATH: &str = "/io/output.json";
const DEFAULT_ORCHESTRATOR_URL: &str = "http://host.docker.internal:8000";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let report = run();
    if let Err(err) = write_output(&report) {
        tracing::error!(%err, "failed to write output.json");
        std::process::exit(1);
    }
}

fn run() -> Value {
    let input = match read_input() {
        Ok(value) => value,
        Err(err) => return failure_report(format!("failed to read {INPUT_PATH}: {err}")),
    };

    let workflow = match Workflow::load(&input) {
        Ok(workflow) => workflow,
        Err(err) => return failure_report(err.to_string()),
    };

    let orchestrator_url =
        std::env::var("ORCHESTRATOR_URL").unwrap_or_else(|_| DEFAULT_ORCHESTRATOR_URL.to_string());
    let client = OrchestratorClient::new(orchestrator_url.clone());

    // Pre-flight connectivity probe (§4.10): distinguishes network
    // misconfiguration from an ordinary capsule failure before any step runs.
    if !client.probe() {
        return failure_report(format!(
            "cannot reach orchestrator at {orchestrator_url}: the workflow capsule cannot make HTTP requests to execute other capsules"
        ));
    }

    let initial_input = input.get("initial_input").cloned().unwrap_or_else(|| json!({}));
    run_steps(&client, &workflow, initial_input)
}

fn run_steps(client: &OrchestratorClient, workflow: &Workflow, initial_input: Value) -> Value {
    let mut current = initial_input;
    let mut step_results = Vec::with_capacity(workflow.steps.len());

    for (index, step) in workflow.steps.iter().enumerate() {
        if let (Some(translator), Some(instructions)) = (&step.translator, &step.translator_instructions) {
            let translator_input = json!({
                "source_output": current,
                "target_capsule": instructions.target_capsule,
                "mapping": instructions.mapping,
                "instructions": instructions.instructions,
            });
            match client.execute(translator, translator_input) {
                Ok(response) if response.success => {
                    current = response.output.unwrap_or_else(|| json!({}));
                }
                Ok(response) => {
                    let error = response.error.unwrap_or_else(|| "translator failed".to_string());
                    return step_failure(index, &step.capsule, step_results, format!("translator '{translator}' failed: {error}"));
                }
                Err(err) => {
                    return step_failure(index, &step.capsule, step_results, format!("translator '{translator}' failed: {err}"));
                }
            }
        }

        match client.execute(&step.capsule, current.clone()) {
            Ok(response) if response.success => {
                current = response.output.unwrap_or_else(|| json!({}));
                step_results.push(json!({
                    "step_index": index,
                    "capsule": step.capsule,
                    "success": true,
                    "output": current,
                }));
            }
            Ok(response) => {
                let error = response.error.unwrap_or_else(|| "unknown error".to_string());
                return step_failure(index, &step.capsule, step_results, error);
            }
            Err(err) => {
                return step_failure(index, &step.capsule, step_results, err.to_string());
            }
        }
    }

    json!({
        "success": true,
        "final_output": current,
        "steps_executed": workflow.steps.len(),
        "step_results": step_results,
    })
}

/// Builds the structured per-step failure report (§4.10 supplement): the
/// caller sees exactly how far the pipeline got, not just a bare error.
fn step_failure(index: usize, capsule: &str, mut step_results: Vec<Value>, error: String) -> Value {
    step_results.push(json!({
        "step_index": index,
        "capsule": capsule,
        "success": false,
        "error": error,
    }));
    json!({
        "success": false,
        "final_output": {},
        "steps_executed": index + 1,
        "error": format!("step {index} ({capsule}) failed: {error}"),
        "step_results": step_results,
    })
}

fn failure_report(error: String) -> Value {
    json!({
        "success": false,
        "final_output": {},
        "steps_executed": 0,
        "error": error,
        "step_results": [],
    })
}

fn read_input() -> std::io::Result<Value> {
    let text = std::fs::read_to_string(INPUT_PATH)?;
    serde_json::from_str(&text).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn write_output(report: &Value) -> std::io::Result<()> {
    let file = std::fs::File::create(OUTPUT_PATH)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

#[cfg(test)]
mod main_tests;

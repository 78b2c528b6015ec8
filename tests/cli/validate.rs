//! `capsulectl validate` specs
//!
//! Verify config validation accepts well-formed registries and reports the
//! specific defect otherwise, without ever starting the daemon.

use crate::prelude::*;

#[test]
fn validate_accepts_a_well_formed_config() {
    let project = Project::empty();
    let config = project.file("config.yaml", MINIMAL_CONFIG);

    project
        .capsulectl()
        .args(&["validate", config.to_str().unwrap()])
        .passes()
        .stdout_has("OK");
}

#[test]
fn validate_rejects_a_config_missing_llm_api_base() {
    let project = Project::empty();
    let config = project.file("config.yaml", CONFIG_MISSING_LLM);

    project
        .capsulectl()
        .args(&["validate", config.to_str().unwrap()])
        .fails()
        .stderr_has("llm.api_base is required");
}

#[test]
fn validate_rejects_a_missing_config_file() {
    let project = Project::empty();

    project
        .capsulectl()
        .args(&["validate", project.path("does-not-exist.yaml").to_str().unwrap()])
        .fails()
        .stderr_has("is invalid");
}

#[test]
fn validate_rejects_malformed_yaml() {
    let project = Project::empty();
    let config = project.file("config.yaml", "capsules: [this is not a map\n");

    project
        .capsulectl()
        .args(&["validate", config.to_str().unwrap()])
        .fails()
        .stderr_has("is invalid");
}

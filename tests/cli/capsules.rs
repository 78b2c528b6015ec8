//! `capsulectl capsules` specs
//!
//! Verify the registered catalogue prints as JSON keyed by capsule name.

use crate::prelude::*;

#[test]
fn capsules_prints_the_registered_catalogue_as_json() {
    let project = Project::empty();
    let config = project.file("config.yaml", MINIMAL_CONFIG);

    let output = project
        .capsulectl()
        .args(&["capsules", config.to_str().unwrap()])
        .passes();

    let parsed: serde_json::Value = serde_json::from_str(&output.stdout()).expect("valid JSON");
    assert_eq!(parsed["echo"], serde_json::json!("capsules/echo:latest"));
}

#[test]
fn capsules_reports_an_empty_catalogue_as_an_empty_object() {
    let project = Project::empty();
    let config = project.file(
        "config.yaml",
        "llm:\n  api_base: \"http://localhost:4000\"\ncapsules: {}\n",
    );

    let output = project
        .capsulectl()
        .args(&["capsules", config.to_str().unwrap()])
        .passes();

    let parsed: serde_json::Value = serde_json::from_str(&output.stdout()).expect("valid JSON");
    assert_eq!(parsed, serde_json::json!({}));
}

#[test]
fn capsules_rejects_an_invalid_config() {
    let project = Project::empty();

    project
        .capsulectl()
        .args(&["capsules", project.path("missing.yaml").to_str().unwrap()])
        .fails()
        .stderr_has("failed to load config");
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use capsule_adapters::fake::{FakeContainerDriver, ScriptedRun};
use capsule_core::test_support::CapsuleBuilder;
use capsule_core::Registry;
use serde_json::json;

use super::*;

fn deps_with(driver: FakeContainerDriver, capsules: Vec<(&str, capsule_core::Capsule)>) -> (ExecutorDeps, tempfile::TempDir) {
    let volumes_dir = tempfile::tempdir().unwrap();
    let registry = Registry::test_with_capsules(
        capsules.into_iter().map(|(name, c)| (name.to_string(), c)).collect(),
    );
    let volumes = VolumeManager::new(volumes_dir.path());
    let deps = ExecutorDeps {
        registry: Arc::new(registry),
        driver: Arc::new(driver),
        volumes: volumes.clone(),
        files: FileManager::new(volumes),
        state: Arc::new(StateTracker::new()),
    };
    (deps, volumes_dir)
}

#[tokio::test]
async fn unknown_capsule_fails_without_touching_the_driver() {
    let driver = FakeContainerDriver::new();
    let (deps, _guard) = deps_with(driver, vec![]);
    let executor = CapsuleExecutor::new(deps);

    let response = executor.execute("nonexistent", json!({}), None, None, None).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("not found"));
}

#[tokio::test]
async fn input_schema_violation_is_fatal_and_never_runs_a_container() {
    let capsule_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        capsule_dir.path().join("schema.json"),
        json!({"input": {"type": "object", "required": ["q"]}}).to_string(),
    )
    .unwrap();
    let capsule = CapsuleBuilder::new("echo").image("echo-image").path(capsule_dir.path()).build();

    let driver = FakeContainerDriver::new();
    let (deps, _guard) = deps_with(driver, vec![("echo", capsule)]);
    let executor = CapsuleExecutor::new(deps);

    let response = executor.execute("echo", json!({}), None, None, None).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("input validation failed"));
}

#[tokio::test]
async fn successful_run_reads_output_and_cleans_up_the_session_tree() {
    let capsule_dir = tempfile::tempdir().unwrap();
    let capsule = CapsuleBuilder::new("echo").image("echo-image").path(capsule_dir.path()).build();

    let driver = FakeContainerDriver::new().with_script(ScriptedRun {
        exit_code: Some(0),
        logs: "hello from container".to_string(),
    });
    let (deps, _guard) = deps_with(driver, vec![("echo", capsule)]);
    let volumes = deps.volumes.clone();
    let executor = CapsuleExecutor::new(deps);

    // Pre-seed output.json as if a container had already written it: the
    // fake driver never touches the filesystem, only the host-side
    // VolumeManager does.
    let session = capsule_core::SessionId::new();
    let (session, paths) = volumes.create(Some(session)).unwrap();
    std::fs::write(paths.output_json(), json!({"answer": 42}).to_string()).unwrap();

    let response = executor.execute("echo", json!({"q": "hi"}), None, Some(session), None).await;
    assert!(response.success);
    assert_eq!(response.output, Some(json!({"answer": 42})));
    assert_eq!(response.logs.as_deref(), Some("hello from container"));
    assert!(!volumes.exists(session));
}

#[tokio::test]
async fn container_timeout_is_reported_as_failure() {
    let capsule_dir = tempfile::tempdir().unwrap();
    let capsule = CapsuleBuilder::new("slow").image("slow-image").path(capsule_dir.path()).build();

    let driver = FakeContainerDriver::new().with_script(ScriptedRun { exit_code: None, logs: String::new() });
    let (deps, _guard) = deps_with(driver, vec![("slow", capsule)]);
    let executor = CapsuleExecutor::new(deps);

    let response = executor.execute("slow", json!({}), None, None, None).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn explicit_input_files_are_staged_before_the_container_runs() {
    let capsule_dir = tempfile::tempdir().unwrap();
    let capsule = CapsuleBuilder::new("echo").image("echo-image").path(capsule_dir.path()).build();
    let source_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(source_file.path(), b"payload").unwrap();

    let driver = FakeContainerDriver::new().with_script(ScriptedRun { exit_code: Some(1), logs: String::new() });
    let (deps, _guard) = deps_with(driver, vec![("echo", capsule)]);
    let executor = CapsuleExecutor::new(deps);

    let mut files = HashMap::new();
    files.insert("data.txt".to_string(), source_file.path().to_string_lossy().into_owned());

    let response = executor.execute("echo", json!({}), Some(files), None, None).await;
    // exit code 1 still fails, but staging must not have errored out first
    assert!(response.error.unwrap().contains("exited with code 1"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn run_docker_reports_the_failing_binary_name_on_error() {
    // Exercises the error-formatting path without requiring a real daemon:
    // a nonexistent subcommand always fails identically across environments.
    let rt = tokio::runtime::Runtime::new().unwrap();
    let result = rt.block_on(run_docker(&["definitely-not-a-subcommand"]));
    assert!(result.is_err());
}

#[test]
fn mount_read_write_defaults_to_rw() {
    let mount = Mount::read_write("/host/session", "/io");
    assert!(!mount.read_only);
    assert_eq!(mount.host_path, "/host/session");
    assert_eq!(mount.container_path, "/io");
}

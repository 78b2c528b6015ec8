// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scaffolding for the `capsulectl` specs: a disposable project
//! directory plus a fluent wrapper around `assert_cmd`.

#![allow(dead_code)]

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A registry config with one capsule whose directory this module also
/// stages, so `validate`/`capsules` resolve it without warnings.
pub const MINIMAL_CONFIG: &str = r#"
llm:
  api_base: "http://localhost:4000"
capsules:
  echo:
    path: "./capsules/echo"
    image: "capsules/echo:latest"
"#;

/// A config with no `llm.api_base`, the one field `Registry::load` requires.
pub const CONFIG_MISSING_LLM: &str = r#"
capsules: {}
"#;

/// A disposable directory standing in for an operator's config tree.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// An empty project with a bare `capsules/echo` capsule directory
    /// already staged, so [`MINIMAL_CONFIG`] resolves cleanly.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("create temp project dir");
        let project = Self { dir };
        project.file("capsules/echo/Dockerfile", "FROM scratch\n");
        project.file("capsules/echo/schema.json", "{}\n");
        project
    }

    /// Write `contents` to `relative` under the project root, creating
    /// parent directories as needed, and return the resolved path.
    pub fn file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write project file");
        path
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// A `capsulectl` invocation scoped to this project's directory.
    pub fn capsulectl(&self) -> Invocation {
        let mut cmd = Command::cargo_bin("capsulectl").expect("capsulectl binary");
        cmd.current_dir(self.dir.path());
        Invocation { cmd }
    }
}

/// A `capsulectl` invocation under construction.
pub struct Invocation {
    cmd: Command,
}

impl Invocation {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd.args(args);
        self
    }

    /// Run the command, asserting it exits successfully.
    pub fn passes(mut self) -> Output {
        let assert = self.cmd.assert().success();
        Output { output: assert.get_output().clone() }
    }

    /// Run the command, asserting it exits with a failure status.
    pub fn fails(mut self) -> Output {
        let assert = self.cmd.assert().failure();
        Output { output: assert.get_output().clone() }
    }
}

/// Captured stdout/stderr from a finished invocation, with fluent
/// substring assertions.
pub struct Output {
    output: std::process::Output,
}

impl Output {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout().contains(needle),
            "expected stdout to contain {needle:?}, got:\n{}",
            self.stdout()
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr().contains(needle),
            "expected stderr to contain {needle:?}, got:\n{}",
            self.stderr()
        );
        self
    }
}

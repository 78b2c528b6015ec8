// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`ContainerDriver`] for tests that exercise
//! `CapsuleExecutor`/`HandoffHandler` without a real Docker daemon.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::driver::{ContainerDriver, ContainerDriverError, ContainerHandle, Mount};

/// A scripted outcome for one `run`+`wait` cycle.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    pub exit_code: Option<i32>,
    pub logs: String,
}

impl Default for ScriptedRun {
    fn default() -> Self {
        Self { exit_code: Some(0), logs: String::new() }
    }
}

/// Records calls and returns scripted results; never shells out.
#[derive(Default)]
pub struct FakeContainerDriver {
    next_id: Mutex<u64>,
    script: Mutex<ScriptedRun>,
    pub runs: Mutex<Vec<(String, Vec<Mount>, Vec<(String, String)>)>>,
}

impl FakeContainerDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, script: ScriptedRun) -> Self {
        *self.script.lock() = script;
        self
    }
}

#[async_trait]
impl ContainerDriver for FakeContainerDriver {
    async fn ensure_network(&self, _name: &str) -> Result<(), ContainerDriverError> {
        Ok(())
    }

    async fn build(&self, _image: &str, _context_path: &Path, _tag: &str) -> Result<(), ContainerDriverError> {
        Ok(())
    }

    async fn image_exists(&self, _image: &str, _tag: &str) -> Result<bool, ContainerDriverError> {
        Ok(true)
    }

    async fn run(
        &self,
        image: &str,
        _tag: &str,
        _network: &str,
        mounts: &[Mount],
        env: &[(String, String)],
        _name: Option<&str>,
    ) -> Result<ContainerHandle, ContainerDriverError> {
        let mut id = self.next_id.lock();
        *id += 1;
        self.runs.lock().push((image.to_string(), mounts.to_vec(), env.to_vec()));
        Ok(ContainerHandle(format!("fake-{id}")))
    }

    async fn wait(
        &self,
        _handle: &ContainerHandle,
        _timeout: Duration,
    ) -> Result<Option<i32>, ContainerDriverError> {
        Ok(self.script.lock().exit_code)
    }

    async fn logs(&self, _handle: &ContainerHandle) -> Result<String, ContainerDriverError> {
        Ok(self.script.lock().logs.clone())
    }

    async fn stop(&self, _handle: &ContainerHandle, _grace: Duration) -> Result<(), ContainerDriverError> {
        Ok(())
    }

    async fn remove(&self, _handle: &ContainerHandle, _force: bool) -> Result<(), ContainerDriverError> {
        Ok(())
    }
}

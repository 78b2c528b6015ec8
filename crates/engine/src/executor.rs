// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CapsuleExecutor (§4.7): the full single-invocation lifecycle — validate,
//! stage, launch, wait, read, clean. This is the core of the orchestrator.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use capsule_adapters::{ContainerDriver, Mount};
use capsule_core::{ExecuteResponse, ExecutionStatus, Registry, SessionId};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::files::FileManager;
use crate::schema::SchemaValidator;
use crate::state::StateTracker;
use crate::volume::VolumeManager;

const DEFAULT_TIMEOUT_SECS: u64 = 3600;
const IMAGE_TAG: &str = "latest";

/// The components `CapsuleExecutor` needs, constructed once at startup and
/// shared across every invocation (§9 design note: process-wide state,
/// never re-initialized per request).
pub struct ExecutorDeps {
    pub registry: Arc<Registry>,
    pub driver: Arc<dyn ContainerDriver>,
    pub volumes: VolumeManager,
    pub files: FileManager,
    pub state: Arc<StateTracker>,
}

pub struct CapsuleExecutor {
    deps: ExecutorDeps,
    /// Compiled `schema.json` per capsule, cached for the lifetime of the
    /// capsule entry (§4.3 supplement) so repeated `/execute` calls don't
    /// recompile it on every invocation.
    schema_cache: RwLock<HashMap<String, Arc<SchemaValidator>>>,
}

impl CapsuleExecutor {
    pub fn new(deps: ExecutorDeps) -> Self {
        Self { deps, schema_cache: RwLock::new(HashMap::new()) }
    }

    /// Return the cached compiled validator for `capsule`, compiling and
    /// caching it on first use.
    fn schema_validator(&self, capsule: &capsule_core::Capsule) -> Result<Arc<SchemaValidator>, String> {
        if let Some(cached) = self.schema_cache.read().get(&capsule.name) {
            return Ok(cached.clone());
        }
        let compiled = Arc::new(SchemaValidator::load(&capsule.path)?);
        self.schema_cache.write().insert(capsule.name.clone(), compiled.clone());
        Ok(compiled)
    }

    pub fn state(&self) -> &Arc<StateTracker> {
        &self.deps.state
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.deps.registry
    }

    pub fn files(&self) -> &FileManager {
        &self.deps.files
    }

    pub fn volumes(&self) -> &VolumeManager {
        &self.deps.volumes
    }

    /// Execute one capsule invocation end to end (§4.7's 18-step contract).
    ///
    /// `input_files` stages `filename -> host source path` pairs into
    /// `input/` before `input.json` is written. `session` lets a caller
    /// (namely `HandoffHandler`) mint the session ahead of time; `parent`
    /// records the handoff-forest back-pointer (§3).
    pub async fn execute(
        &self,
        capsule_name: &str,
        mut input: Value,
        input_files: Option<std::collections::HashMap<String, String>>,
        session: Option<SessionId>,
        parent: Option<SessionId>,
    ) -> ExecuteResponse {
        // Step 1: mint session, register running.
        let session = session.unwrap_or_default();
        self.deps.state.register_execution(session, capsule_name, parent);

        // Step 2: look up capsule.
        let Some(capsule) = self.deps.registry.capsule(capsule_name).cloned() else {
            self.deps.state.update_status(session, ExecutionStatus::Failed, None);
            return ExecuteResponse::failure(format!("capsule '{capsule_name}' not found"));
        };

        // Step 3: validate input schema (fatal).
        let validator = match self.schema_validator(&capsule) {
            Ok(v) => v,
            Err(reason) => {
                self.deps.state.update_status(session, ExecutionStatus::Failed, None);
                return ExecuteResponse::failure(format!("schema validation error: {reason}"));
            }
        };
        if let Err(detail) = validator.validate_input(&input) {
            self.deps.state.update_status(session, ExecutionStatus::Failed, None);
            return ExecuteResponse::failure(format!("input validation failed: {detail}"));
        }

        // Step 4: create session tree.
        let (session, paths) = match self.deps.volumes.create(Some(session)) {
            Ok(pair) => pair,
            Err(err) => {
                self.deps.state.update_status(session, ExecutionStatus::Failed, None);
                return ExecuteResponse::failure(format!("failed to create session volume: {err}"));
            }
        };

        let result = self
            .run_in_session(&capsule, &mut input, input_files, session, &paths, &validator)
            .await;

        // Step 18: always destroy the session tree on the way out.
        self.deps.volumes.remove(session);

        result
    }

    #[allow(clippy::too_many_lines)]
    async fn run_in_session(
        &self,
        capsule: &capsule_core::Capsule,
        input: &mut Value,
        input_files: Option<std::collections::HashMap<String, String>>,
        session: SessionId,
        paths: &crate::volume::SessionPaths,
        validator: &SchemaValidator,
    ) -> ExecuteResponse {
        // Step 5: stage explicit files.
        if let Some(files) = input_files {
            for (name, src) in files {
                if let Err(err) = self.deps.files.stage_input(Path::new(&src), session, &name) {
                    self.deps.state.update_status(session, ExecutionStatus::Failed, None);
                    return ExecuteResponse::failure(format!("failed to copy input file {name}: {err}"));
                }
            }
        }

        // Step 6: implicit file staging for `input.file` / `input.files`.
        if let Err(err) = self.stage_implicit_files(input, session) {
            self.deps.state.update_status(session, ExecutionStatus::Failed, None);
            return ExecuteResponse::failure(format!("failed to stage implicit file: {err}"));
        }

        // Step 7: write input.json.
        if let Err(err) = self.deps.files.write_input_json(session, input) {
            self.deps.state.update_status(session, ExecutionStatus::Failed, None);
            return ExecuteResponse::failure(format!("failed to write input json: {err}"));
        }

        // Step 8: ensure the image is built.
        match self.deps.driver.image_exists(&capsule.image, IMAGE_TAG).await {
            Ok(true) => {}
            _ => {
                if let Err(err) =
                    self.deps.driver.build(&capsule.image, &capsule.path, IMAGE_TAG).await
                {
                    self.deps.state.update_status(session, ExecutionStatus::Failed, None);
                    return ExecuteResponse::failure(format!(
                        "failed to build image for capsule {}: {err}",
                        capsule.name
                    ));
                }
            }
        }

        // Step 9: compose env.
        let orchestrator_url = self.deps.registry.orchestrator_url();
        let llm_api_base = self.deps.registry.llm_api_base().to_string();
        let llm_api_key = self.deps.registry.llm_api_key();
        let env = vec![
            ("ORCHESTRATOR_URL".to_string(), orchestrator_url),
            ("OPENAI_API_BASE".to_string(), llm_api_base.clone()),
            ("LITELLM_API_BASE".to_string(), llm_api_base),
            ("OPENAI_API_KEY".to_string(), llm_api_key),
        ];

        // Step 10: run the container.
        let mount = Mount::read_write(paths.root().to_string_lossy(), "/io");
        let container_name = format!("aod-{}", short_id(&session.to_string()));
        let network = self.deps.registry.docker().network.clone();
        let handle = match self
            .deps
            .driver
            .run(&capsule.image, IMAGE_TAG, &network, &[mount], &env, Some(&container_name))
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                self.deps.state.update_status(session, ExecutionStatus::Failed, None);
                return ExecuteResponse::failure(format!("failed to start container: {err}"));
            }
        };
        info!(%session, capsule = %capsule.name, container = %handle, "container started");
        self.deps.state.update_status(session, ExecutionStatus::Running, Some(handle.to_string()));

        // Step 11: wait with timeout.
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let exit_code = match self.deps.driver.wait(&handle, timeout).await {
            Ok(Some(code)) => code,
            Ok(None) => {
                warn!(%session, "container timed out, stopping and force-removing");
                let _ = self.deps.driver.stop(&handle, Duration::from_secs(10)).await;
                let _ = self.deps.driver.remove(&handle, true).await;
                self.deps.state.update_status(session, ExecutionStatus::Failed, None);
                return ExecuteResponse::failure("container execution timed out or failed");
            }
            Err(err) => {
                error!(%session, %err, "error waiting for container");
                let _ = self.deps.driver.remove(&handle, true).await;
                self.deps.state.update_status(session, ExecutionStatus::Failed, None);
                return ExecuteResponse::failure(format!("container execution failed: {err}"));
            }
        };

        // Step 12: capture logs unconditionally.
        let logs = self.deps.driver.logs(&handle).await.unwrap_or_default();

        // Step 13: non-zero exit.
        if exit_code != 0 {
            let _ = self.deps.driver.remove(&handle, true).await;
            self.deps.state.update_status(session, ExecutionStatus::Failed, None);
            let mut resp =
                ExecuteResponse::failure(format!("container exited with code {exit_code}"));
            resp.logs = Some(logs);
            return resp;
        }

        // Step 14: read output.json.
        let Some(output) = self.deps.files.read_output_json(session) else {
            let _ = self.deps.driver.remove(&handle, true).await;
            self.deps.state.update_status(session, ExecutionStatus::Failed, None);
            let mut resp = ExecuteResponse::failure("failed to read output.json");
            resp.logs = Some(logs);
            return resp;
        };

        // Step 15: validate output (non-fatal).
        if let Err(detail) = validator.validate_output(&output) {
            warn!(%session, capsule = %capsule.name, %detail, "output schema validation failed");
        }

        // Step 16: list output files.
        let files = self.deps.files.list_output_files(session);

        // Step 17: remove container, mark completed.
        let _ = self.deps.driver.remove(&handle, true).await;
        self.deps.state.update_status(session, ExecutionStatus::Completed, None);

        ExecuteResponse {
            success: true,
            output: Some(output),
            files: Some(files),
            error: None,
            session_id: Some(session.to_string()),
            logs: Some(logs),
        }
    }

    /// Implicit file staging (§4.7 step 6): `input.file` or each element of
    /// `input.files`, if a host-resolvable path, is copied into `input/` and
    /// rewritten to `/io/input/<basename>`. Strings that don't resolve on
    /// the host are passed through unchanged — this is intentionally silent.
    fn stage_implicit_files(&self, input: &mut Value, session: SessionId) -> std::io::Result<()> {
        let Some(obj) = input.as_object_mut() else {
            return Ok(());
        };

        if let Some(Value::String(path)) = obj.get("file").cloned() {
            if let Some(rewritten) = self.stage_one(&path, session)? {
                obj.insert("file".to_string(), Value::String(rewritten));
            }
        }

        if let Some(Value::Array(list)) = obj.get("files").cloned() {
            let mut rewritten_list = Vec::with_capacity(list.len());
            for item in list {
                match item {
                    Value::String(path) => match self.stage_one(&path, session)? {
                        Some(rewritten) => rewritten_list.push(Value::String(rewritten)),
                        None => rewritten_list.push(Value::String(path)),
                    },
                    other => rewritten_list.push(other),
                }
            }
            obj.insert("files".to_string(), Value::Array(rewritten_list));
        }

        Ok(())
    }

    fn stage_one(&self, host_path: &str, session: SessionId) -> std::io::Result<Option<String>> {
        let path = Path::new(host_path);
        if !path.exists() {
            return Ok(None);
        }
        let Some(basename) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        self.deps.files.stage_input(path, session, basename)?;
        Ok(Some(format!("/io/input/{basename}")))
    }
}

fn short_id(session: &str) -> &str {
    &session[..session.len().min(8)]
}

#[cfg(test)]
mod executor_tests;

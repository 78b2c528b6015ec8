// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FileManager (§4.2): all file movement is copy-with-metadata-preservation.
//! The source is never moved, since it may still be referenced elsewhere
//! (e.g. a handoff's `outgoing/` file is also readable by the caller capsule
//! after the copy).

use std::path::Path;

use capsule_core::SessionId;
use serde_json::Value;
use tracing::warn;

use crate::volume::VolumeManager;

#[derive(Debug, Clone)]
pub struct FileManager {
    volumes: VolumeManager,
}

impl FileManager {
    pub fn new(volumes: VolumeManager) -> Self {
        Self { volumes }
    }

    fn copy_preserving_metadata(src: &Path, dst: &Path) -> std::io::Result<()> {
        std::fs::copy(src, dst)?;
        if let Ok(meta) = std::fs::metadata(src) {
            let _ = std::fs::set_permissions(dst, meta.permissions());
        }
        Ok(())
    }

    /// Copy an external file into `<session>/input/<name>`.
    pub fn stage_input(&self, src: &Path, session: SessionId, name: &str) -> std::io::Result<()> {
        let dst = self.volumes.paths(session).input_dir().join(name);
        Self::copy_preserving_metadata(src, &dst)
    }

    /// Atomically write `input.json` with 2-space indentation for operator
    /// readability on disk (not part of the wire contract).
    pub fn write_input_json(&self, session: SessionId, payload: &Value) -> std::io::Result<()> {
        let path = self.volumes.paths(session).input_json();
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, payload)?;
        Ok(())
    }

    /// Reads `output.json`. Returns `None` for a missing file, invalid JSON,
    /// or any IO error — each case logged distinctly, but the caller-facing
    /// contract makes no distinction between them (§4.2 supplement).
    pub fn read_output_json(&self, session: SessionId) -> Option<Value> {
        let path = self.volumes.paths(session).output_json();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(%session, %err, "output.json missing or unreadable");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%session, %err, "output.json is not valid JSON");
                None
            }
        }
    }

    /// Names of every file written under `<session>/output/`.
    pub fn list_output_files(&self, session: SessionId) -> Vec<String> {
        let dir = self.volumes.paths(session).output_dir();
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect()
    }

    /// Used by handoff: transfer a file the caller placed in its
    /// `handoff/outgoing/` into the callee's `input/`.
    pub fn copy_outgoing_to_input(
        &self,
        src_session: SessionId,
        dst_session: SessionId,
        name: &str,
    ) -> std::io::Result<()> {
        let src = self.volumes.paths(src_session).handoff_outgoing_dir().join(name);
        let dst = self.volumes.paths(dst_session).input_dir().join(name);
        Self::copy_preserving_metadata(&src, &dst)
    }

    /// After the callee returns, each of its output files is reflected into
    /// the caller's `handoff/incoming/`.
    pub fn copy_output_to_incoming(
        &self,
        src_session: SessionId,
        dst_session: SessionId,
        name: &str,
    ) -> std::io::Result<()> {
        let src = self.volumes.paths(src_session).output_dir().join(name);
        let dst = self.volumes.paths(dst_session).handoff_incoming_dir().join(name);
        Self::copy_preserving_metadata(&src, &dst)
    }

    /// Whether `name` is a file the session has already offered in
    /// `handoff/outgoing/` — used by `HandoffHandler` to decide whether a
    /// string argument denotes a file reference (§4.8 step 2, §9 ambiguity
    /// note).
    pub fn exists_in_outgoing(&self, session: SessionId, name: &str) -> bool {
        self.volumes.paths(session).handoff_outgoing_dir().join(name).is_file()
    }
}

#[cfg(test)]
mod files_tests;

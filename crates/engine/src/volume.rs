// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VolumeManager (§4.1): pure path arithmetic over a configured base
//! directory. No locking — each session has a unique path, so operations on
//! distinct sessions are independent by construction.

use std::path::{Path, PathBuf};

use capsule_core::SessionId;
use tracing::{debug, warn};

/// The four fixed subpaths plus the two JSON payload files that make up one
/// session's directory tree (§3).
#[derive(Debug, Clone)]
pub struct SessionPaths {
    root: PathBuf,
}

impl SessionPaths {
    fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join("input")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn handoff_outgoing_dir(&self) -> PathBuf {
        self.root.join("handoff").join("outgoing")
    }

    pub fn handoff_incoming_dir(&self) -> PathBuf {
        self.root.join("handoff").join("incoming")
    }

    pub fn input_json(&self) -> PathBuf {
        self.root.join("input.json")
    }

    pub fn output_json(&self) -> PathBuf {
        self.root.join("output.json")
    }
}

/// Creates, locates, and destroys per-session directory trees.
///
/// Removal is best-effort: a failure is logged but never propagates to the
/// caller (§4.1). `remove` is idempotent — removing an already-absent
/// session succeeds and returns `false`.
#[derive(Debug, Clone)]
pub struct VolumeManager {
    base_path: PathBuf,
}

impl VolumeManager {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    pub fn paths(&self, session: SessionId) -> SessionPaths {
        SessionPaths::new(self.base_path.join(session.to_string()))
    }

    /// Create a fresh tree with the four subdirectories, minting a new
    /// session id if none is supplied.
    pub fn create(&self, session: Option<SessionId>) -> std::io::Result<(SessionId, SessionPaths)> {
        let session = session.unwrap_or_default();
        let paths = self.paths(session);
        std::fs::create_dir_all(paths.input_dir())?;
        std::fs::create_dir_all(paths.output_dir())?;
        std::fs::create_dir_all(paths.handoff_outgoing_dir())?;
        std::fs::create_dir_all(paths.handoff_incoming_dir())?;
        debug!(%session, root = %paths.root().display(), "created session volume");
        Ok((session, paths))
    }

    pub fn exists(&self, session: SessionId) -> bool {
        self.paths(session).root().exists()
    }

    /// Destroy a session's tree. Idempotent: returns `false` (not an error)
    /// if the tree is already absent.
    pub fn remove(&self, session: SessionId) -> bool {
        let root = self.paths(session).root().to_path_buf();
        if !root.exists() {
            return false;
        }
        match std::fs::remove_dir_all(&root) {
            Ok(()) => {
                debug!(%session, "removed session volume");
                true
            }
            Err(err) => {
                warn!(%session, %err, "failed to remove session volume");
                false
            }
        }
    }

    /// Remove every session tree under the base path. Used at shutdown;
    /// never raises past the caller.
    pub fn cleanup_all(&self) -> usize {
        let Ok(entries) = std::fs::read_dir(&self.base_path) else {
            return 0;
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                if std::fs::remove_dir_all(entry.path()).is_ok() {
                    removed += 1;
                } else {
                    warn!(path = %entry.path().display(), "failed to clean up volume on shutdown");
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod volume_tests;

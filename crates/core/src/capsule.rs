// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The static capsule registry entry.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A capsule's unique name, as it appears in the registry and on the wire.
pub type CapsuleName = String;

/// A registered, containerized worker unit.
///
/// Immutable for the lifetime of an orchestrator run: capsules are read from
/// the configuration document once at startup (see [`crate::registry`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capsule {
    pub name: CapsuleName,
    /// Container image reference (built from `path/Dockerfile` if absent).
    pub image: String,
    /// Filesystem root holding the build context and `schema.json`.
    pub path: PathBuf,
}

impl Capsule {
    pub fn new(name: impl Into<String>, image: impl Into<String>, path: PathBuf) -> Self {
        Self { name: name.into(), image: image.into(), path }
    }

    /// Path to this capsule's declared `{input, output}` schema document.
    pub fn schema_path(&self) -> PathBuf {
        self.path.join("schema.json")
    }

    /// Path to the build context's `Dockerfile`.
    pub fn dockerfile_path(&self) -> PathBuf {
        self.path.join("Dockerfile")
    }
}

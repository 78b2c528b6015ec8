// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders, gated behind the `test-support` feature.

use std::path::PathBuf;

use crate::capsule::Capsule;

/// Builds a [`Capsule`] with sensible test defaults, overriding only what a
/// test cares about.
pub struct CapsuleBuilder {
    name: String,
    image: String,
    path: PathBuf,
}

impl CapsuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { image: format!("{name}:latest"), path: PathBuf::from(format!("/capsules/{name}")), name }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn build(self) -> Capsule {
        Capsule::new(self.name, self.image, self.path)
    }
}

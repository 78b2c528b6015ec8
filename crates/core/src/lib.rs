// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! capsule-core: shared data model and error taxonomy for the capsule orchestrator.

pub mod capsule;
pub mod error;
pub mod execution;
pub mod handoff;
pub mod registry;
pub mod session;
pub mod wire;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use capsule::{Capsule, CapsuleName};
pub use error::OrchestratorError;
pub use execution::{ExecutionRecord, ExecutionStatus};
pub use handoff::HandoffEdge;
pub use registry::{DockerConfig, LlmConfig, Registry, ServerConfig};
pub use session::SessionId;
pub use wire::{
    CapsuleSummary, ExecuteRequest, ExecuteResponse, HandoffRequest, HandoffResponse,
    VisualizerEdge, VisualizerNode, VisualizerState,
};

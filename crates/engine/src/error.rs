// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the orchestration/governor layer.

use ac_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data model error: {0}")]
    Core(#[from] CoreError),

    #[error("storage error: {0}")]
    Storage(#[from] ac_storage::StorageError),

    #[error("adapter error: {0}")]
    Adapter(#[from] ac_adapters::AdapterError),

    #[error("orchestration run was cancelled")]
    Cancelled,

    /// An injected [`crate::runner::GoalDecomposer`]/[`crate::runner::SpecBootstrapper`]
    /// port failed in a way this crate has no variant for (e.g. a spec
    /// bootstrap error from a crate this one doesn't depend on). Callers
    /// that implement those ports outside this crate use this to surface
    /// their own error without this crate needing to know about it.
    #[error("spec bootstrap port error: {0}")]
    Bootstrap(String),

    /// `--resume` named a session that either doesn't exist or is already
    /// finalized (and therefore permanently immutable — see
    /// [`crate::runner::CloseLoopRunner::run`]'s resume path).
    #[error("cannot resume session: {0}")]
    ResumeUnavailable(String),

    /// The saved session's policy (goal flags/gate thresholds at the time
    /// it was started) doesn't match what was just invoked, and
    /// `--allow-drift` wasn't passed.
    #[error("policy drift on resume: {0}")]
    PolicyDrift(String),
}

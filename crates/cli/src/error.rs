// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (§7) and exit-code mapping (§6: 0 success, 2 policy
//! violation, 1 operational error).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("data model error: {0}")]
    Core(#[from] ac_core::CoreError),

    #[error("storage error: {0}")]
    Storage(#[from] ac_storage::StorageError),

    #[error("adapter error: {0}")]
    Adapter(#[from] ac_adapters::AdapterError),

    #[error("engine error: {0}")]
    Engine(#[from] ac_engine::EngineError),

    #[error("control-plane error: {0}")]
    Control(#[from] ac_control::ControlError),

    #[error("spec bootstrap error: {0}")]
    Specs(#[from] ac_specs::SpecsError),

    #[error("tests gate error: {0}")]
    Shell(#[from] ac_shell::ShellError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),

    /// A gate, DoD, or release decision came back blocked. Reported to the
    /// user, not retried; surfaces as exit code 2 unless the command has
    /// already decided to treat it as success (e.g. a batch's
    /// `partial-failed` summary is still exit 0).
    #[error("policy violation: {0}")]
    PolicyViolation(String),
}

impl CliError {
    /// Exit code per §6: configuration/resource/fatal errors are 1; an
    /// explicit policy violation is 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::PolicyViolation(_) => 2,
            _ => 1,
        }
    }
}

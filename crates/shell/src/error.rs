// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for test-gate command execution.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("command failed to start: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("command timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("command io error: {0}")]
    Io(#[source] std::io::Error),
}

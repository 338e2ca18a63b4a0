// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for adapter subprocess execution.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{description} failed to start: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{description} timed out after {timeout_secs}s")]
    Timeout {
        description: String,
        timeout_secs: u64,
    },

    #[error("{description}: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
}

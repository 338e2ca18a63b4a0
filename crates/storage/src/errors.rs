// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error type for the storage layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lock acquisition failed at {path}: held by another process")]
    Locked { path: std::path::PathBuf },

    #[error("lease held by {holder_id}, expires in the future")]
    LeaseHeld { holder_id: String },

    #[error("session {session_id} already exists")]
    SessionCollision { session_id: String },

    #[error("session {session_id} is already finalized and cannot be rewritten")]
    SessionFinalized { session_id: String },

    #[error("migration error: {0}")]
    Migration(#[from] crate::migration::MigrationError),
}

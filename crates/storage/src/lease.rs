// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lease lock file I/O: acquisition, TTL-based takeover, heartbeat, and
//! release (§4.3).
//!
//! Acquisition is "atomic create-exclusive": a candidate that finds an
//! existing, unexpired lease backs off; one that finds the lease file
//! missing, or present but expired, writes its own lease atomically.

use ac_core::{Clock, LeaseLockState};
use std::path::{Path, PathBuf};

use crate::atomic::{read_json_strict, write_json};
use crate::clock_time::epoch_ms_to_datetime;
use crate::errors::StorageError;

/// A held lease, guarding a single path. Dropping this value does not
/// release the lease — call `release` explicitly so the caller controls
/// exactly when the filesystem is touched (mirrors the task lock's
/// explicit-release contract, since both participate in agent-deregistration
/// cleanup).
pub struct Lease {
    path: PathBuf,
    holder_id: String,
}

impl Lease {
    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extend the lease by writing a fresh `acquired_at` at the current
    /// clock time, keeping the same TTL.
    pub fn heartbeat<C: Clock>(&self, clock: &C, ttl_ms: u64) -> Result<(), StorageError> {
        let state = LeaseLockState::new(
            self.holder_id.clone(),
            epoch_ms_to_datetime(clock.epoch_ms()),
            ttl_ms,
        );
        write_json(&self.path, &state)
    }

    /// Release the lease by deleting its file. A no-op if already gone.
    pub fn release(self) -> Result<(), StorageError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Attempt to acquire the lease at `path`.
///
/// Succeeds if no lease file exists, or if the existing lease is expired
/// (takeover). Fails with [`StorageError::LeaseHeld`] if a live lease is
/// held by someone else.
pub fn acquire<C: Clock>(
    path: &Path,
    holder_id: impl Into<String>,
    ttl_ms: u64,
    clock: &C,
) -> Result<Lease, StorageError> {
    let holder_id = holder_id.into();
    let now = epoch_ms_to_datetime(clock.epoch_ms());
    if let Some(existing) = read_json_strict::<LeaseLockState>(path)? {
        if !existing.is_expired(now) {
            return Err(StorageError::LeaseHeld {
                holder_id: existing.holder_id,
            });
        }
    }
    let state = LeaseLockState::new(holder_id.clone(), now, ttl_ms);
    write_json(path, &state)?;
    Ok(Lease {
        path: path.to_owned(),
        holder_id,
    })
}

/// Read the current lease state without attempting to acquire it.
pub fn inspect(path: &Path) -> Result<Option<LeaseLockState>, StorageError> {
    read_json_strict(path)
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;

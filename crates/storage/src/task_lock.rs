// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-`(spec, task)` lock files, the finer-grained sibling of the
//! controller lease lock (§3 "Task Lock", §4.3).
//!
//! Task locks don't carry their own TTL in the payload; expiry is computed
//! from `acquired_at + ttl`, with the TTL supplied by the caller at check
//! time, matching spec.md's "expiry is computed from timestamp plus a
//! configured TTL" wording.

use ac_core::{Clock, TaskLockState};
use std::path::{Path, PathBuf};

use crate::atomic::{read_json_strict, write_json};
use crate::clock_time::epoch_ms_to_datetime;
use crate::errors::StorageError;

/// Directory layout: one file per `(spec_id, task_id)` under `locks_root`.
pub fn lock_path(locks_root: &Path, spec_id: &str, task_id: &str) -> PathBuf {
    locks_root.join(spec_id).join(format!("{task_id}.lock"))
}

/// Acquire the task lock, failing if an unexpired lock already exists.
pub fn acquire<C: Clock>(
    path: &Path,
    agent_id: impl Into<String>,
    reason: impl Into<String>,
    ttl: chrono::Duration,
    clock: &C,
) -> Result<(), StorageError> {
    let now = epoch_ms_to_datetime(clock.epoch_ms());
    if let Some(existing) = read_json_strict::<TaskLockState>(path)? {
        if now.signed_duration_since(existing.acquired_at) < ttl {
            return Err(StorageError::Locked {
                path: path.to_owned(),
            });
        }
    }
    let state = TaskLockState::new(agent_id, now, reason);
    write_json(path, &state)
}

pub fn release(path: &Path) -> Result<(), StorageError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

pub fn inspect(path: &Path) -> Result<Option<TaskLockState>, StorageError> {
    read_json_strict(path)
}

/// Release every task lock under `locks_root` held by `agent_id`.
///
/// Called when an agent deregisters (§3 "Agent Registration" invariant:
/// stale entries' locks are released).
pub fn release_all_for_agent(locks_root: &Path, agent_id: &str) -> Result<usize, StorageError> {
    let mut released = 0;
    if !locks_root.exists() {
        return Ok(0);
    }
    for spec_dir in std::fs::read_dir(locks_root)? {
        let spec_dir = spec_dir?.path();
        if !spec_dir.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&spec_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("lock") {
                continue;
            }
            if let Some(state) = read_json_strict::<TaskLockState>(&path)? {
                if state.agent_id == agent_id {
                    std::fs::remove_file(&path)?;
                    released += 1;
                }
            }
        }
    }
    Ok(released)
}

#[cfg(test)]
#[path = "task_lock_tests.rs"]
mod tests;

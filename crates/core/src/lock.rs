// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock payload shapes for the lease lock (controller takeover, §4.3,
//! §4.9) and the per-spec task lock (agent mutual exclusion, §4.3, §4.5).
//!
//! These are plain data: acquisition, TTL expiry checks against a real
//! clock, and file I/O live in `ac-storage`'s lease module so this crate
//! stays free of filesystem concerns.

use serde::{Deserialize, Serialize};

/// On-disk payload for the controller lease lock.
///
/// A holder is considered to have an expired lease once
/// `acquired_at + ttl_ms` is in the past; a competing controller may then
/// take over by overwriting the file (§4.3 "takeover rule").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseLockState {
    pub holder_id: String,
    pub acquired_at: chrono::DateTime<chrono::Utc>,
    pub ttl_ms: u64,
}

impl LeaseLockState {
    pub fn new(holder_id: impl Into<String>, acquired_at: chrono::DateTime<chrono::Utc>, ttl_ms: u64) -> Self {
        Self {
            holder_id: holder_id.into(),
            acquired_at,
            ttl_ms,
        }
    }

    pub fn expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.acquired_at + chrono::Duration::milliseconds(self.ttl_ms as i64)
    }

    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// On-disk payload for a per-spec task lock, preventing two agents from
/// working the same spec concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLockState {
    pub agent_id: String,
    pub acquired_at: chrono::DateTime<chrono::Utc>,
    pub reason: String,
}

impl TaskLockState {
    pub fn new(
        agent_id: impl Into<String>,
        acquired_at: chrono::DateTime<chrono::Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            acquired_at,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;

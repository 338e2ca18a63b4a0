// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registration entries, keyed by `{machineFingerprint}:{instanceIndex}`
//! so multiple engine instances on the same machine don't collide, and
//! garbage-collected once their heartbeat goes stale (§3 "Agent
//! Registration", §4.5).

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for a running agent instance.
    pub struct AgentId;
}

/// Build the registry key for an agent instance on a given machine.
pub fn registry_key(machine_fingerprint: &str, instance_index: u32) -> String {
    format!("{}:{}", machine_fingerprint, instance_index)
}

/// A single registered, heartbeating agent instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub agent_id: AgentId,
    pub machine_fingerprint: String,
    pub instance_index: u32,
    pub pid: u32,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub last_heartbeat: chrono::DateTime<chrono::Utc>,
}

impl AgentRegistration {
    pub fn new(
        agent_id: AgentId,
        machine_fingerprint: impl Into<String>,
        instance_index: u32,
        pid: u32,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let machine_fingerprint = machine_fingerprint.into();
        Self {
            agent_id,
            machine_fingerprint,
            instance_index,
            pid,
            started_at: now,
            last_heartbeat: now,
        }
    }

    pub fn key(&self) -> String {
        registry_key(&self.machine_fingerprint, self.instance_index)
    }

    pub fn heartbeat(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.last_heartbeat = now;
    }

    /// Whether this registration should be garbage-collected: no heartbeat
    /// observed within `timeout`.
    pub fn is_stale(&self, now: chrono::DateTime<chrono::Utc>, timeout: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_heartbeat) >= timeout
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

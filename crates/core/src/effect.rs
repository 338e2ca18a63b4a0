// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the engine needs to perform, kept as
//! plain data so the orchestration loop in `ac-engine` stays pure and
//! testable (§4.4-§4.11).

use crate::recovery::FailureSignature;
use crate::registry::AgentId;
use crate::scope::RecoveryScope;
use crate::session::{Event, SessionId};
use crate::spec::SpecId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Side effects the orchestration loop needs the runtime to carry out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Append an event to a session's durable log.
    RecordEvent { session_id: SessionId, event: Event },

    /// Launch an agent adapter subprocess against a spec's workspace.
    LaunchAgent {
        agent_id: AgentId,
        spec_id: SpecId,
        workspace_path: PathBuf,
        prompt: String,
        env: Vec<(String, String)>,
        #[serde(with = "duration_serde")]
        timeout: Duration,
    },

    /// Abort a running agent, e.g. on timeout or escalation.
    AbortAgent { agent_id: AgentId, reason: String },

    /// Acquire the controller lease lock.
    AcquireLease { holder_id: String, ttl_ms: u64 },

    /// Release the controller lease lock.
    ReleaseLease { holder_id: String },

    /// Run a gate command (build, lint, tests) as part of Definition of
    /// Done evaluation.
    RunGateCommand {
        spec_id: SpecId,
        gate_name: String,
        command: String,
        cwd: PathBuf,
        env: HashMap<String, String>,
    },

    /// Persist the outcome of a recovery-memory lookup back to disk.
    RecordRecoveryOutcome {
        scope: RecoveryScope,
        signature: FailureSignature,
        success: bool,
    },

    /// Prune sessions and recovery entries past their retention window.
    PruneSessions { older_than_days: u32 },

    /// Execute an operator-facing advisory action (e.g. suggested manual
    /// remediation surfaced by the Governance Loop).
    ExecuteAdvisory {
        spec_id: Option<SpecId>,
        command: String,
        cwd: PathBuf,
    },

    /// Send a desktop notification.
    Notify { title: String, message: String },
}

impl Effect {
    /// Effect name for log spans (e.g. "launch_agent", "run_gate_command").
    pub fn name(&self) -> &'static str {
        match self {
            Effect::RecordEvent { .. } => "record_event",
            Effect::LaunchAgent { .. } => "launch_agent",
            Effect::AbortAgent { .. } => "abort_agent",
            Effect::AcquireLease { .. } => "acquire_lease",
            Effect::ReleaseLease { .. } => "release_lease",
            Effect::RunGateCommand { .. } => "run_gate_command",
            Effect::RecordRecoveryOutcome { .. } => "record_recovery_outcome",
            Effect::PruneSessions { .. } => "prune_sessions",
            Effect::ExecuteAdvisory { .. } => "execute_advisory",
            Effect::Notify { .. } => "notify",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::RecordEvent { session_id, event } => vec![
                ("session_id", session_id.to_string()),
                ("event", event.log_summary()),
            ],
            Effect::LaunchAgent {
                agent_id,
                spec_id,
                workspace_path,
                timeout,
                ..
            } => vec![
                ("agent_id", agent_id.to_string()),
                ("spec_id", spec_id.to_string()),
                ("workspace_path", workspace_path.display().to_string()),
                ("timeout_ms", timeout.as_millis().to_string()),
            ],
            Effect::AbortAgent { agent_id, reason } => vec![
                ("agent_id", agent_id.to_string()),
                ("reason", reason.clone()),
            ],
            Effect::AcquireLease { holder_id, ttl_ms } => vec![
                ("holder_id", holder_id.clone()),
                ("ttl_ms", ttl_ms.to_string()),
            ],
            Effect::ReleaseLease { holder_id } => vec![("holder_id", holder_id.clone())],
            Effect::RunGateCommand {
                spec_id,
                gate_name,
                cwd,
                ..
            } => vec![
                ("spec_id", spec_id.to_string()),
                ("gate_name", gate_name.clone()),
                ("cwd", cwd.display().to_string()),
            ],
            Effect::RecordRecoveryOutcome {
                scope,
                signature,
                success,
            } => vec![
                ("scope", scope.to_string()),
                ("signature", signature.to_string()),
                ("success", success.to_string()),
            ],
            Effect::PruneSessions { older_than_days } => {
                vec![("older_than_days", older_than_days.to_string())]
            }
            Effect::ExecuteAdvisory { spec_id, cwd, .. } => vec![
                (
                    "spec_id",
                    spec_id
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                ),
                ("cwd", cwd.display().to_string()),
            ],
            Effect::Notify { title, .. } => vec![("title", title.clone())],
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;

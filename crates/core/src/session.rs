// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session envelope: the shared shape persisted by `ac-storage`'s session
//! archive for every long-running operation (§3, §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Sortable session identifier: `{goalIndex}-{yyyymmddhhmmss}` or a
    /// user-supplied id.
    pub struct SessionId;
}

/// Which subsystem a session belongs to. Sessions are partitioned into a
/// directory per kind (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    CloseLoop,
    Batch,
    Controller,
    Governance,
    SpecArtifact,
}

impl SessionKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            SessionKind::CloseLoop => "close-loop",
            SessionKind::Batch => "batch",
            SessionKind::Controller => "controller",
            SessionKind::Governance => "governance",
            SessionKind::SpecArtifact => "spec-artifact",
        }
    }

    pub const ALL: [SessionKind; 5] = [
        SessionKind::CloseLoop,
        SessionKind::Batch,
        SessionKind::Controller,
        SessionKind::Governance,
        SessionKind::SpecArtifact,
    ];
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Terminal and in-flight states a session can be in (§3, §8 invariant:
/// `ended_at.is_some()` implies `status != Running`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Running,
    Completed,
    PartialFailed,
    Failed,
    Interrupted,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::PartialFailed => "partial-failed",
            SessionStatus::Failed => "failed",
            SessionStatus::Interrupted => "interrupted",
        };
        write!(f, "{}", s)
    }
}

/// A single append-only event recorded against a session (§4.1
/// `append_event`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub at: chrono::DateTime<chrono::Utc>,
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub data: serde_json::Map<String, Value>,
}

impl Event {
    pub fn new(kind: impl Into<String>, at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            at,
            kind: kind.into(),
            data: serde_json::Map::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Short one-line summary for structured logging.
    pub fn log_summary(&self) -> String {
        if self.data.is_empty() {
            self.kind.clone()
        } else {
            format!("{} {}", self.kind, Value::Object(self.data.clone()))
        }
    }
}

/// The durable, append-safe JSON snapshot for one long-running operation
/// (§3 "Session Snapshot", §6 file format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnvelope {
    pub schema_version: u32,
    pub session_id: SessionId,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub inputs: Value,
    #[serde(default)]
    pub outputs: Value,
    #[serde(default)]
    pub policy: Value,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Schema version written by this build. Bumped whenever the envelope shape
/// changes in a way `ac-control`'s `schema migrate` command needs to know
/// about.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

impl SessionEnvelope {
    pub fn new(
        session_id: SessionId,
        kind: SessionKind,
        started_at: chrono::DateTime<chrono::Utc>,
        inputs: Value,
    ) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            session_id,
            kind,
            status: SessionStatus::Running,
            started_at,
            ended_at: None,
            inputs,
            outputs: Value::Null,
            policy: Value::Null,
            events: Vec::new(),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.ended_at.is_some()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Archive: durable, append-safe JSON snapshots for every
//! long-running operation, partitioned by kind, with retention and resume
//! lookup (§4.1).
//!
//! Sessions are partitioned into one directory per [`SessionKind`]. Each
//! write goes through [`crate::atomic::write_json`] (write-temp-then-rename).
//! Once a session is finalized (`ended_at` set) its file is never rewritten
//! again — callers that try are rejected with
//! [`StorageError::SessionFinalized`].

use ac_core::{Event, SessionEnvelope, SessionId, SessionKind, SessionStatus};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::atomic::{read_json_quarantine_on_corrupt, read_json_strict, write_json};
use crate::errors::StorageError;

#[derive(Clone)]
pub struct SessionArchive {
    root: PathBuf,
}

/// Resume selector (§4.1 `resume`).
#[derive(Debug, Clone)]
pub enum ResumeSelector {
    Latest,
    Interrupted,
    Id(SessionId),
    Path(PathBuf),
}

impl SessionArchive {
    /// `root` is the project-scoped state directory; sessions live under
    /// `root/sessions/{kind}/*.json`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project-scoped state directory this archive is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: SessionKind) -> PathBuf {
        self.root.join("sessions").join(kind.dir_name())
    }

    fn session_path(&self, kind: SessionKind, id: &SessionId) -> PathBuf {
        self.kind_dir(kind).join(format!("{}.json", id.as_str()))
    }

    /// Allocate a new snapshot file in `running` state. Fails if a session
    /// with this id already exists for this kind.
    pub fn create(
        &self,
        kind: SessionKind,
        id: SessionId,
        started_at: chrono::DateTime<chrono::Utc>,
        inputs: Value,
    ) -> Result<SessionEnvelope, StorageError> {
        let path = self.session_path(kind, &id);
        if path.exists() {
            return Err(StorageError::SessionCollision {
                session_id: id.to_string(),
            });
        }
        let envelope = SessionEnvelope::new(id, kind, started_at, inputs);
        write_json(&path, &envelope)?;
        Ok(envelope)
    }

    /// Append an event and persist it immediately.
    ///
    /// Events could be buffered in memory and flushed on finalize or
    /// checkpoint; since every write here is a full atomic rewrite of a
    /// small JSON document rather than an append to a log file, persisting
    /// on every call is equivalent to an explicit checkpoint after each
    /// event and keeps crash exposure to zero.
    pub fn append_event(
        &self,
        kind: SessionKind,
        envelope: &mut SessionEnvelope,
        event: Event,
    ) -> Result<(), StorageError> {
        if envelope.is_finalized() {
            return Err(StorageError::SessionFinalized {
                session_id: envelope.session_id.to_string(),
            });
        }
        envelope.events.push(event);
        let path = self.session_path(kind, &envelope.session_id);
        write_json(&path, envelope)
    }

    /// Write the terminal snapshot once and mark it read-only thereafter.
    pub fn finalize(
        &self,
        kind: SessionKind,
        envelope: &mut SessionEnvelope,
        status: SessionStatus,
        outputs: Value,
        ended_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StorageError> {
        if envelope.is_finalized() {
            return Err(StorageError::SessionFinalized {
                session_id: envelope.session_id.to_string(),
            });
        }
        envelope.status = status;
        envelope.outputs = outputs;
        envelope.ended_at = Some(ended_at);
        let path = self.session_path(kind, &envelope.session_id);
        write_json(&path, envelope)
    }

    /// Load a session by id within a kind.
    ///
    /// A partially written snapshot (no trailing rename) simply doesn't
    /// exist from the filesystem's point of view. Corrupt JSON on a
    /// finalized snapshot is reported rather than silently dropped.
    pub fn load(
        &self,
        kind: SessionKind,
        id: &SessionId,
    ) -> Result<Option<SessionEnvelope>, StorageError> {
        read_json_strict(&self.session_path(kind, id))
    }

    /// List all sessions of a kind, newest-id-first. Corrupt entries are
    /// quarantined to `.bak` and skipped rather than failing the whole
    /// listing.
    pub fn list(&self, kind: SessionKind) -> Result<Vec<SessionEnvelope>, StorageError> {
        let dir = self.kind_dir(kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut envelopes = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(envelope) = read_json_quarantine_on_corrupt::<SessionEnvelope>(&path)? {
                envelopes.push(envelope);
            }
        }
        envelopes.sort_by(|a, b| b.session_id.as_str().cmp(a.session_id.as_str()));
        Ok(envelopes)
    }

    /// Resolve a resume selector to a session envelope.
    pub fn resume(
        &self,
        kind: SessionKind,
        selector: &ResumeSelector,
    ) -> Result<Option<SessionEnvelope>, StorageError> {
        match selector {
            ResumeSelector::Id(id) => self.load(kind, id),
            ResumeSelector::Path(path) => read_json_strict(path),
            ResumeSelector::Latest => Ok(self.list(kind)?.into_iter().next()),
            ResumeSelector::Interrupted => Ok(self
                .list(kind)?
                .into_iter()
                .find(|e| e.status != SessionStatus::Completed)),
        }
    }

    /// Delete sessions not in `protect`, keeping the newest `keep`, and
    /// only those older than `older_than_days` (§4.1 `prune`).
    pub fn prune(
        &self,
        kind: SessionKind,
        keep: usize,
        older_than_days: u32,
        protect: &[SessionId],
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<usize, StorageError> {
        let all = self.list(kind)?;
        let mut removed = 0;
        for (i, envelope) in all.iter().enumerate() {
            if i < keep {
                continue;
            }
            if protect.iter().any(|p| p == &envelope.session_id) {
                continue;
            }
            let reference = envelope.ended_at.unwrap_or(envelope.started_at);
            let age_days = now.signed_duration_since(reference).num_days();
            if age_days < older_than_days as i64 {
                continue;
            }
            let path = self.session_path(kind, &envelope.session_id);
            if path.exists() {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

pub fn default_session_root(project_root: &Path) -> PathBuf {
    project_root.join(".auto")
}

#[cfg(test)]
#[path = "session_archive_tests.rs"]
mod tests;

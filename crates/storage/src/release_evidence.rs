// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release-Evidence Document: an append-only record of release-gate run
//! outcomes, trimmed by a configurable retention window (§3, §4.11).
//!
//! Modeled the same way as the session archive rather than as one giant
//! JSON array: each outcome is its own atomically-written file under
//! `release-evidence/`, so appends never risk corrupting history already on
//! disk, matching the persisted-state layout's `release-evidence/*.json`
//! glob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::atomic::{read_json_quarantine_on_corrupt, write_json};
use crate::errors::StorageError;
use crate::filelock::with_lock;

/// One recorded release-gate run outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub id: String,
    pub recorded_at: DateTime<Utc>,
    pub outcome: Value,
}

pub struct EvidenceLog {
    dir: PathBuf,
    lock_path: PathBuf,
}

impl EvidenceLog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            dir: root.join("release-evidence"),
            lock_path: root.join("release-evidence.lock"),
        }
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Append one outcome. Appends are serialized through the shared lock
    /// even though each entry is its own file, so a concurrent `trim` never
    /// observes a half-written entry.
    pub fn append(
        &self,
        id: impl Into<String>,
        recorded_at: DateTime<Utc>,
        outcome: Value,
    ) -> Result<EvidenceEntry, StorageError> {
        let id = id.into();
        with_lock(&self.lock_path, || {
            let entry = EvidenceEntry {
                id: id.clone(),
                recorded_at,
                outcome,
            };
            write_json(&self.entry_path(&id), &entry)?;
            Ok(entry)
        })
    }

    /// All entries, oldest first (ids are sortable timestamps).
    pub fn list(&self) -> Result<Vec<EvidenceEntry>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for item in std::fs::read_dir(&self.dir)? {
            let path = item?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(entry) = read_json_quarantine_on_corrupt::<EvidenceEntry>(&path)? {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(entries)
    }

    /// Keep only the newest `keep` entries, or every entry recorded within
    /// `window_days` when `keep` is `None`. Returns the number removed.
    pub fn trim(
        &self,
        keep: Option<usize>,
        window_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<usize, StorageError> {
        with_lock(&self.lock_path, || {
            let entries = self.list()?;
            let total = entries.len();
            let mut survivors_from_end = total;
            if let Some(keep) = keep {
                survivors_from_end = survivors_from_end.min(keep);
            }
            let cutoff_index = total.saturating_sub(survivors_from_end);

            let mut removed = 0;
            for (i, entry) in entries.iter().enumerate() {
                let outside_keep = i < cutoff_index;
                let outside_window = window_days
                    .map(|days| {
                        now.signed_duration_since(entry.recorded_at).num_days() >= days as i64
                    })
                    .unwrap_or(false);
                if outside_keep || outside_window {
                    let path = self.entry_path(&entry.id);
                    if path.exists() {
                        std::fs::remove_file(&path)?;
                        removed += 1;
                    }
                }
            }
            Ok(removed)
        })
    }
}

pub fn default_evidence_root(project_root: &Path) -> PathBuf {
    project_root.join(".auto")
}

#[cfg(test)]
#[path = "release_evidence_tests.rs"]
mod tests;

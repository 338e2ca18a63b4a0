// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery Memory: a single JSON document mapping
//! `scope -> signature -> RecoveryEntry`, guarded by a file lock so
//! concurrent writers serialize (§4.2).
//!
//! Reused primitive: the same [`crate::filelock`] used for task locks, not
//! a bespoke mutex, so every writer to this shared document serializes
//! through one lock.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ac_core::recovery::{ActionSource, FailureSignature, RecoveryEntry, SelectedAction};
use ac_core::{Clock, RecoveryScope};

use crate::atomic::{read_json_quarantine_on_corrupt, write_json};
use crate::clock_time::epoch_ms_to_datetime;
use crate::errors::StorageError;
use crate::filelock::with_lock;

type SignatureMap = BTreeMap<String, RecoveryEntry>;
type RecoveryDocument = BTreeMap<String, SignatureMap>;

/// Default entry lifetime absent an explicit override (open question
/// resolution: 30 days, matching this store's default job-retention
/// window).
pub const DEFAULT_TTL_DAYS: u32 = 30;

pub struct RecoveryStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl RecoveryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            path: root.join("recovery-memory.json"),
            lock_path: root.join("recovery-memory.json.lock"),
        }
    }

    fn load(&self) -> Result<RecoveryDocument, StorageError> {
        Ok(read_json_quarantine_on_corrupt(&self.path)?.unwrap_or_default())
    }

    fn save(&self, doc: &RecoveryDocument) -> Result<(), StorageError> {
        write_json(&self.path, doc)
    }

    /// Pick the remediation action for `(scope, signature)` among
    /// `available_actions`, falling back to `default_action` when memory
    /// has nothing usable. The decision always carries its source and an
    /// explanation, never a bare index.
    pub fn select_action(
        &self,
        scope: &RecoveryScope,
        signature: &FailureSignature,
        available_actions: &[usize],
        default_action: usize,
    ) -> Result<SelectedAction, StorageError> {
        with_lock(&self.lock_path, || {
            let doc = self.load()?;
            let remembered = doc
                .get(scope.as_str())
                .and_then(|signatures| signatures.get(signature.as_str()));

            if let Some(entry) = remembered {
                if available_actions.contains(&entry.action_index) {
                    return Ok(SelectedAction {
                        action_index: entry.action_index,
                        source: ActionSource::Memory,
                        explanation: format!(
                            "recovery memory: {} successes in {} attempts (rate {:.0}%)",
                            entry.successes,
                            entry.attempts,
                            entry.success_rate() * 100.0
                        ),
                    });
                }
            }

            Ok(SelectedAction {
                action_index: default_action,
                source: ActionSource::Default,
                explanation: "no usable recovery-memory entry for this signature".to_string(),
            })
        })
    }

    /// Record an outcome for `(scope, signature, action)`. If the
    /// remembered action differs from `action`, the entry is replaced and
    /// its counters reset — memory tracks the currently favored action,
    /// not a per-action history.
    pub fn record_outcome<C: Clock>(
        &self,
        scope: &RecoveryScope,
        signature: &FailureSignature,
        action: usize,
        success: bool,
        ttl_days: u32,
        clock: &C,
    ) -> Result<(), StorageError> {
        let now = epoch_ms_to_datetime(clock.epoch_ms());
        with_lock(&self.lock_path, || {
            let mut doc = self.load()?;
            let signatures = doc.entry(scope.as_str().to_string()).or_default();
            let entry = signatures
                .entry(signature.as_str().to_string())
                .or_insert_with(|| RecoveryEntry::new(action, now, ttl_days));

            if entry.action_index != action {
                *entry = RecoveryEntry::new(action, now, ttl_days);
            }
            entry.record_outcome(success, now);
            self.save(&doc)
        })
    }

    /// Remove entries older than `older_than_days`, optionally limited to
    /// one scope. Returns the number of entries removed.
    pub fn prune<C: Clock>(
        &self,
        scope: Option<&RecoveryScope>,
        older_than_days: u32,
        clock: &C,
    ) -> Result<usize, StorageError> {
        let now = epoch_ms_to_datetime(clock.epoch_ms());
        with_lock(&self.lock_path, || {
            let mut doc = self.load()?;
            let mut removed = 0;
            let scopes: Vec<String> = match scope {
                Some(s) => vec![s.as_str().to_string()],
                None => doc.keys().cloned().collect(),
            };
            for scope_key in scopes {
                if let Some(signatures) = doc.get_mut(&scope_key) {
                    let before = signatures.len();
                    signatures.retain(|_, entry| !entry.is_stale(now, older_than_days));
                    removed += before - signatures.len();
                }
            }
            doc.retain(|_, signatures| !signatures.is_empty());
            self.save(&doc)?;
            Ok(removed)
        })
    }

    /// Read-only view of one scope, or the whole document when `scope` is
    /// `None`.
    pub fn show(&self, scope: Option<&RecoveryScope>) -> Result<RecoveryDocument, StorageError> {
        let doc = self.load()?;
        match scope {
            Some(s) => Ok(doc
                .get(s.as_str())
                .map(|signatures| {
                    let mut single = RecoveryDocument::new();
                    single.insert(s.as_str().to_string(), signatures.clone());
                    single
                })
                .unwrap_or_default()),
            None => Ok(doc),
        }
    }

    /// List every scope with at least one entry.
    pub fn scopes(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.load()?.into_keys().collect())
    }
}

pub fn default_recovery_root(project_root: &Path) -> PathBuf {
    project_root.join(".auto")
}

#[cfg(test)]
#[path = "recovery_store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery memory entry types and failure-signature normalization (§4.2).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A deterministic signature derived from sorted, normalized failure
/// tokens: error class plus prominent identifiers, with volatile parts
/// (numbers, timestamps, paths) masked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureSignature(String);

impl FailureSignature {
    /// Normalize raw failure text (e.g. stderr tail) into a signature.
    ///
    /// Masks volatile substrings then sorts+dedupes the remaining tokens so
    /// semantically-identical failures collapse to the same key regardless
    /// of token order.
    pub fn derive(error_class: &str, raw_text: &str) -> Self {
        let masked = mask_volatile(raw_text);
        let mut tokens: Vec<&str> = masked
            .split(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
            .filter(|t| !t.is_empty())
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        let body = tokens.join(" ");
        Self(format!("{}:{}", error_class, body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FailureSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[allow(clippy::expect_used)]
fn mask_volatile(text: &str) -> String {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();
    static PATH_RE: OnceLock<Regex> = OnceLock::new();

    let timestamp_re = TIMESTAMP_RE.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?")
            .expect("valid timestamp regex")
    });
    let path_re =
        PATH_RE.get_or_init(|| Regex::new(r"(/[\w.\-]+)+").expect("valid path regex"));
    let number_re = NUMBER_RE.get_or_init(|| Regex::new(r"\d+").expect("valid number regex"));

    let masked = timestamp_re.replace_all(text, "<ts>");
    let masked = path_re.replace_all(&masked, "<path>");
    let masked = number_re.replace_all(&masked, "<n>");
    masked.to_lowercase()
}

/// Where a recovery-memory selection came from, carried alongside every
/// decision so it stays explainable (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    Memory,
    Default,
    Explicit,
}

/// The result of `select_action`: which remediation action to take, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedAction {
    pub action_index: usize,
    pub source: ActionSource,
    pub explanation: String,
}

/// A single scoped recovery-memory entry: `(scope, signature) -> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    pub action_index: usize,
    pub attempts: u32,
    pub successes: u32,
    pub last_used_at: chrono::DateTime<chrono::Utc>,
    pub ttl_days: u32,
}

impl RecoveryEntry {
    pub fn new(action_index: usize, now: chrono::DateTime<chrono::Utc>, ttl_days: u32) -> Self {
        Self {
            action_index,
            attempts: 0,
            successes: 0,
            last_used_at: now,
            ttl_days,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }

    pub fn record_outcome(&mut self, success: bool, now: chrono::DateTime<chrono::Utc>) {
        self.attempts += 1;
        if success {
            self.successes += 1;
        }
        self.last_used_at = now;
    }

    pub fn is_stale(&self, now: chrono::DateTime<chrono::Utc>, older_than_days: u32) -> bool {
        let age = now.signed_duration_since(self.last_used_at);
        age.num_days() >= older_than_days as i64
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery-memory scoping and the `namespace/name` key convention shared by
//! the session archive, the recovery store, and the controller queue.

use std::path::Path;
use std::process::Command;

/// Build a namespace-scoped key from namespace and name.
///
/// When namespace is empty, returns the bare name. Otherwise returns
/// `"{namespace}/{name}"`.
pub fn scoped_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}

/// Parse a namespace-scoped key into `(namespace, name)`.
///
/// Returns `("", key)` when no slash is present.
pub fn split_scoped_name(scoped: &str) -> (&str, &str) {
    match scoped.split_once('/') {
        Some((ns, name)) => (ns, name),
        None => ("", scoped),
    }
}

/// The default recovery-memory scope: `projectFingerprint + gitBranch`.
///
/// Keeps remediation statistics from one repository/branch from leaking
/// into the selection for an unrelated one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RecoveryScope(String);

impl RecoveryScope {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the default scope for a project root: a short fingerprint of
    /// the canonicalized path, combined with the current git branch if one
    /// can be resolved. Falls back to the fingerprint alone outside a repo.
    pub fn for_project(project_root: &Path) -> Self {
        let fingerprint = project_fingerprint(project_root);
        match current_branch(project_root) {
            Some(branch) => Self(format!("{}:{}", fingerprint, branch)),
            None => Self(fingerprint),
        }
    }
}

impl std::fmt::Display for RecoveryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecoveryScope {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn project_fingerprint(project_root: &Path) -> String {
    use sha2::{Digest, Sha256};
    let canonical = std::fs::canonicalize(project_root).unwrap_or_else(|_| project_root.into());
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex_prefix(&digest, 12)
}

fn hex_prefix(bytes: &[u8], n: usize) -> String {
    bytes
        .iter()
        .take(n / 2 + n % 2)
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(n)
        .collect()
}

fn current_branch(project_root: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(project_root)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let branch = String::from_utf8(output.stdout).ok()?;
    let branch = branch.trim();
    if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch.to_string())
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff Manifest (§3): a declarative JSON document describing an
//! upstream project's specs, templates, capabilities, and gaps, used by
//! the Release Gate Evaluator's capability-coverage signal (§4.11).

use std::collections::HashSet;
use std::path::Path;

use ac_storage::read_json_strict;
use serde::{Deserialize, Serialize};

use crate::error::SpecsError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffManifest {
    pub source_project: String,
    #[serde(default)]
    pub specs: Vec<String>,
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
}

impl HandoffManifest {
    pub fn load(path: &Path) -> Result<Option<Self>, SpecsError> {
        Ok(read_json_strict(path)?)
    }

    pub fn expected_capabilities(&self) -> &[String] {
        &self.capabilities
    }
}

/// Lexicon fallback for capability coverage (§4.11 "manifest-declared or
/// lexicon-inferred expected capabilities") when no manifest is declared:
/// extract capability-like tokens from a set of spec/goal texts by
/// matching `as a capability noun` phrasing and bare `capability:` tags.
pub fn infer_capabilities_from_lexicon(texts: &[String]) -> Vec<String> {
    let mut found: HashSet<String> = HashSet::new();
    for text in texts {
        for line in text.lines() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed
                .strip_prefix("capability:")
                .or_else(|| trimmed.strip_prefix("Capability:"))
            {
                let cap = rest.trim().to_lowercase();
                if !cap.is_empty() {
                    found.insert(cap);
                }
            }
        }
    }
    let mut result: Vec<String> = found.into_iter().collect();
    result.sort();
    result
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec discovery: scanning a project root for `NN-NN-name` directories.

use std::path::Path;

use ac_core::SpecId;

use crate::bundle::SpecBundle;
use crate::error::SpecsError;
use crate::naming::parse_spec_name;

/// List every spec bundle directly under `root`, sorted by directory name
/// (which sorts by goal index, then sub index, per the `NN-NN-name`
/// numbering scheme).
pub fn discover_specs(root: &Path) -> Result<Vec<SpecBundle>, SpecsError> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if parse_spec_name(&name).is_ok() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| SpecBundle::new(root, SpecId::new(name)))
        .collect())
}

/// Find a single spec bundle by id, if its directory exists under `root`.
pub fn find_spec(root: &Path, id: &SpecId) -> Result<Option<SpecBundle>, SpecsError> {
    let bundle = SpecBundle::new(root, id.clone());
    if bundle.path().exists() {
        Ok(Some(bundle))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "find_tests.rs"]
mod tests;

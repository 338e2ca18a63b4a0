// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaboration metadata plumbing: building a project-wide dependency
//! graph across bootstrapped specs and checking it is acyclic (§3, §9
//! "cyclic collaboration graphs").

use std::collections::HashMap;
use std::path::Path;

use ac_core::spec::check_acyclic;
use ac_core::SpecId;

use crate::error::SpecsError;
use crate::find::discover_specs;

/// Build the dependency graph (`spec -> specs it depends on`) from every
/// bootstrapped spec's `collaboration.json` under `root`.
pub fn dependency_graph(root: &Path) -> Result<HashMap<SpecId, Vec<SpecId>>, SpecsError> {
    let mut graph = HashMap::new();
    for bundle in discover_specs(root)? {
        let deps = match bundle.load_collaboration()? {
            Some(collaboration) => collaboration
                .dependencies
                .into_iter()
                .map(|dep| dep.spec)
                .collect(),
            None => Vec::new(),
        };
        graph.insert(bundle.id().clone(), deps);
    }
    Ok(graph)
}

/// Check that the project-wide collaboration graph under `root` is
/// acyclic.
pub fn check_project_acyclic(root: &Path) -> Result<(), SpecsError> {
    let graph = dependency_graph(root)?;
    check_acyclic(&graph)?;
    Ok(())
}

#[cfg(test)]
#[path = "collaboration_tests.rs"]
mod tests;

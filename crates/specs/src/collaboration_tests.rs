// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::spec::{Collaboration, Dependency, DependencyType};
use tempfile::tempdir;

use super::*;
use crate::bundle::SpecBundle;

fn sub_with_dep(root: &Path, name: &str, dep_on: Option<&str>) -> SpecBundle {
    let bundle = SpecBundle::new(root, SpecId::new(name));
    std::fs::create_dir_all(bundle.path()).unwrap();
    let now = chrono::Utc::now();
    let deps = match dep_on {
        Some(other) => vec![Dependency {
            spec: SpecId::new(other),
            kind: DependencyType::RequiresCompletion,
            reason: "ordering".to_string(),
        }],
        None => vec![],
    };
    let collaboration = Collaboration::new_sub(SpecId::new("00-00-master"), deps, now);
    bundle.save_collaboration(&collaboration).unwrap();
    bundle
}

#[test]
fn dependency_graph_collects_every_bootstrapped_spec() {
    let dir = tempdir().unwrap();
    sub_with_dep(dir.path(), "00-01-a", None);
    sub_with_dep(dir.path(), "00-02-b", Some("00-01-a"));

    let graph = dependency_graph(dir.path()).unwrap();
    assert_eq!(graph.len(), 2);
    assert_eq!(graph[&SpecId::new("00-02-b")], vec![SpecId::new("00-01-a")]);
}

#[test]
fn check_project_acyclic_passes_for_a_linear_chain() {
    let dir = tempdir().unwrap();
    sub_with_dep(dir.path(), "00-01-a", None);
    sub_with_dep(dir.path(), "00-02-b", Some("00-01-a"));

    assert!(check_project_acyclic(dir.path()).is_ok());
}

#[test]
fn check_project_acyclic_rejects_a_cycle() {
    let dir = tempdir().unwrap();
    sub_with_dep(dir.path(), "00-01-a", Some("00-02-b"));
    sub_with_dep(dir.path(), "00-02-b", Some("00-01-a"));

    assert!(check_project_acyclic(dir.path()).is_err());
}

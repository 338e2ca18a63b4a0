// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;

use tempfile::tempdir;

use super::*;
use crate::decompose::decompose_goal;

#[test]
fn bootstrap_plan_creates_a_bundle_per_spec_with_skeleton_docs() {
    let dir = tempdir().unwrap();
    let goal = Goal::new("ship invoicing");
    let plan = decompose_goal(&goal, Some(3), std::iter::empty());

    let drafts = bootstrap_plan(dir.path(), &plan, &goal, chrono::Utc::now()).unwrap();

    assert_eq!(drafts.len(), 3);
    let master_bundle = SpecBundle::new(dir.path(), plan.master_spec.clone());
    assert!(master_bundle.required_docs_present());
    assert!(master_bundle.load_collaboration().unwrap().is_some());
    for draft in &drafts {
        let bundle = SpecBundle::new(dir.path(), draft.spec_id.clone());
        assert!(bundle.required_docs_present());
        assert!(bundle.load_collaboration().unwrap().is_some());
    }
}

#[test]
fn bootstrap_plan_does_not_overwrite_an_existing_collaboration_document() {
    let dir = tempdir().unwrap();
    let goal = Goal::new("ship invoicing");
    let plan = decompose_goal(&goal, Some(2), std::iter::empty());

    bootstrap_plan(dir.path(), &plan, &goal, chrono::Utc::now()).unwrap();
    let master_bundle = SpecBundle::new(dir.path(), plan.master_spec.clone());
    let mut collaboration = master_bundle.load_collaboration().unwrap().unwrap();
    collaboration
        .transition(ac_core::spec::SpecStatus::Ready, chrono::Utc::now())
        .unwrap();
    master_bundle.save_collaboration(&collaboration).unwrap();

    bootstrap_plan(dir.path(), &plan, &goal, chrono::Utc::now()).unwrap();

    let reloaded = master_bundle.load_collaboration().unwrap().unwrap();
    assert_eq!(reloaded.status.current, ac_core::spec::SpecStatus::Ready);
}

#[test]
fn replan_plan_only_rebuilds_drafts_for_failed_specs() {
    let dir = tempdir().unwrap();
    let goal = Goal::new("ship invoicing");
    let plan = decompose_goal(&goal, Some(3), std::iter::empty());
    bootstrap_plan(dir.path(), &plan, &goal, chrono::Utc::now()).unwrap();

    let mut failed = HashSet::new();
    failed.insert(plan.sub_specs[1].clone());

    let drafts = replan_plan(dir.path(), &plan, &goal, &failed).unwrap();

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].spec_id, plan.sub_specs[1]);
    assert!(drafts[0].prompt.contains("retry"));
}

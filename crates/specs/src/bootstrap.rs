// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! BOOTSTRAP_SPECS (§4.6): materialize a [`SpecPlan`] into spec
//! directories, collaboration metadata, and orchestrator-ready task
//! drafts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ac_core::spec::Collaboration;
use ac_core::{Goal, SpecId};
use chrono::{DateTime, Utc};

use crate::bundle::SpecBundle;
use crate::decompose::SpecPlan;
use crate::error::SpecsError;

/// One spec, ready to hand to the agent orchestrator (§4.5). Mirrors the
/// shape `ac_engine::SpecTask` expects; kept as a local type so this crate
/// does not need to depend on the engine crate to produce it — the CLI
/// layer maps one to the other when wiring the two together.
#[derive(Debug, Clone)]
pub struct SpecTaskDraft {
    pub spec_id: SpecId,
    pub workspace_path: PathBuf,
    pub prompt: String,
    pub criticality: i64,
}

fn sub_prompt(goal: &Goal, sub_spec: &SpecId, index: usize, total: usize) -> String {
    format!(
        "{}\n\nYou are responsible for sub-spec {} ({} of {}). \
         Read requirements.md, design.md, and tasks.md in your spec directory \
         before making changes, and check off each task in tasks.md as you complete it.",
        goal.text,
        sub_spec.as_str(),
        index,
        total
    )
}

/// Create skeleton directories, write skeleton documents, and persist
/// collaboration metadata for every spec in `plan`. Returns one
/// [`SpecTaskDraft`] per sub-spec, in plan order.
pub fn bootstrap_plan(
    root: &Path,
    plan: &SpecPlan,
    goal: &Goal,
    now: DateTime<Utc>,
) -> Result<Vec<SpecTaskDraft>, SpecsError> {
    let master_bundle = SpecBundle::new(root, plan.master_spec.clone());
    master_bundle.write_skeleton(&goal.text)?;
    if master_bundle.load_collaboration()?.is_none() {
        let collaboration = Collaboration::new_master(plan.sub_specs.clone(), now);
        master_bundle.save_collaboration(&collaboration)?;
    }

    let total = plan.sub_specs.len();
    let mut drafts = Vec::with_capacity(total);
    for (index, sub_spec) in plan.sub_specs.iter().enumerate() {
        let bundle = SpecBundle::new(root, sub_spec.clone());
        bundle.write_skeleton(&goal.text)?;
        if bundle.load_collaboration()?.is_none() {
            let collaboration = Collaboration::new_sub(plan.master_spec.clone(), Vec::new(), now);
            bundle.save_collaboration(&collaboration)?;
        }
        drafts.push(SpecTaskDraft {
            spec_id: sub_spec.clone(),
            workspace_path: bundle.path(),
            prompt: sub_prompt(goal, sub_spec, index + 1, total),
            criticality: 0,
        });
    }

    Ok(drafts)
}

/// REPLAN_CYCLE (§4.6): rebuild task drafts for the sub-specs that did not
/// terminally succeed in the prior cycle, narrowing the prompt to mention
/// the retry.
pub fn replan_plan(
    root: &Path,
    plan: &SpecPlan,
    goal: &Goal,
    failed_specs: &HashSet<SpecId>,
) -> Result<Vec<SpecTaskDraft>, SpecsError> {
    let total = plan.sub_specs.len();
    let mut drafts = Vec::new();
    for (index, sub_spec) in plan.sub_specs.iter().enumerate() {
        if !failed_specs.contains(sub_spec) {
            continue;
        }
        let bundle = SpecBundle::new(root, sub_spec.clone());
        let mut prompt = sub_prompt(goal, sub_spec, index + 1, total);
        prompt.push_str(
            "\n\nThis is a retry after a prior cycle did not satisfy the gate; \
             review what was left incomplete before proceeding.",
        );
        drafts.push(SpecTaskDraft {
            spec_id: sub_spec.clone(),
            workspace_path: bundle.path(),
            prompt,
            criticality: 0,
        });
    }
    Ok(drafts)
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;

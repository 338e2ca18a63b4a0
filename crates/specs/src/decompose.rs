// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DECOMPOSE (§4.6): split one goal into a master spec and `subCount ∈
//! [2,5]` sub-specs.

use ac_core::{Goal, SpecId};

use crate::naming::{format_spec_name, MASTER_SUB_INDEX};
use crate::slug::spec_slug;

const COMPLEXITY_KEYWORDS: &[&str] = &[
    "integrate",
    "integration",
    "migrate",
    "migration",
    "across",
    "multiple",
    "pipeline",
    "end-to-end",
    "end to end",
    "refactor",
    "and then",
];

/// Output of DECOMPOSE: a master spec id and its sub-spec ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPlan {
    pub master_spec: SpecId,
    pub sub_specs: Vec<SpecId>,
}

/// Score a goal's complexity on a 0.0-1.0 scale: word count and presence
/// of multi-part/integration keywords both push the score up.
pub fn complexity_score(goal_text: &str) -> f64 {
    let word_count = goal_text.split_whitespace().count();
    let length_score = (word_count as f64 / 40.0).min(1.0);

    let lower = goal_text.to_lowercase();
    let keyword_hits = COMPLEXITY_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count();
    let keyword_score = (keyword_hits as f64 / 3.0).min(1.0);

    (length_score * 0.5 + keyword_score * 0.5).clamp(0.0, 1.0)
}

/// Map a complexity score to a sub-spec count in `[2,5]`.
pub fn sub_count_for_score(score: f64) -> u8 {
    2 + (score * 3.0).round() as u8
}

/// Split `goal` into a master spec and its sub-specs. `sub_override` pins
/// the count instead of deriving it from [`complexity_score`].
///
/// `existing_names` lists every spec directory name already bootstrapped
/// under the project root, used to pick the next free goal index.
pub fn decompose_goal<'a>(
    goal: &Goal,
    sub_override: Option<u8>,
    existing_names: impl Iterator<Item = &'a str>,
) -> SpecPlan {
    let sub_count = sub_override
        .unwrap_or_else(|| sub_count_for_score(complexity_score(&goal.text)))
        .clamp(2, 5);

    let goal_index = crate::naming::next_goal_index(existing_names);
    let slug = spec_slug(&goal.text, 40);

    let master_spec = SpecId::new(format_spec_name(goal_index, MASTER_SUB_INDEX, &slug));
    let sub_specs = (1..=sub_count)
        .map(|sub_index| {
            SpecId::new(format_spec_name(
                goal_index,
                sub_index as u32,
                &format!("{slug}-part-{sub_index}"),
            ))
        })
        .collect();

    SpecPlan {
        master_spec,
        sub_specs,
    }
}

#[cfg(test)]
#[path = "decompose_tests.rs"]
mod tests;

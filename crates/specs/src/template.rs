// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${var}` template interpolation, and the skeleton documents written by
//! BOOTSTRAP_SPECS (§4.6).

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex pattern for `${variable_name}` or `${namespace.variable_name}`.
#[allow(clippy::expect_used)]
pub static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}")
        .expect("constant regex pattern is valid")
});

/// Interpolate `${name}` placeholders with values from `vars`. Unknown
/// variables are left as-is.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(val) => val.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Render the `requirements.md` skeleton for a freshly bootstrapped spec.
pub fn render_requirements(goal_text: &str, spec_name: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("goal".to_string(), goal_text.to_string());
    vars.insert("spec_name".to_string(), spec_name.to_string());
    interpolate(
        "# Requirements: ${spec_name}\n\n\
         ## Goal\n\n${goal}\n\n\
         ## User Stories\n\n- [ ] As a user, I want this goal realized end to end.\n\n\
         ## Acceptance Criteria\n\n- [ ] Behavior matches the goal above.\n",
        &vars,
    )
}

/// Render the `design.md` skeleton for a freshly bootstrapped spec.
pub fn render_design(goal_text: &str, spec_name: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("goal".to_string(), goal_text.to_string());
    vars.insert("spec_name".to_string(), spec_name.to_string());
    interpolate(
        "# Design: ${spec_name}\n\n\
         ## Approach\n\n_To be filled in while implementing: ${goal}_\n\n\
         ## Interfaces\n\n- Provides: (none declared yet)\n- Consumes: (none declared yet)\n",
        &vars,
    )
}

/// Render the `tasks.md` skeleton for a freshly bootstrapped spec.
///
/// `tasks-closed` (§4.6 GATE) reads this file's checkbox lines, so every
/// bootstrapped spec starts with at least one open checkbox.
pub fn render_tasks(spec_name: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("spec_name".to_string(), spec_name.to_string());
    interpolate(
        "# Tasks: ${spec_name}\n\n\
         - [ ] Implement the behavior described in requirements.md\n\
         - [ ] Satisfy the acceptance criteria\n",
        &vars,
    )
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

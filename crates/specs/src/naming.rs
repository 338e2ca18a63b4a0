// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec directory naming: `NN-NN-kebab-case` (§3).
//!
//! The two leading numbers are a goal index (which broad goal this spec
//! belongs to) and a spec index within that goal. A master spec always
//! takes sub index `00`; its sub-specs take `01`..`05`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SpecsError;

#[allow(clippy::expect_used)]
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-(\d{2})-([a-z0-9]+(?:-[a-z0-9]+)*)$")
        .expect("constant regex pattern is valid"));

pub const MASTER_SUB_INDEX: u32 = 0;

/// Parse an `NN-NN-kebab-case` directory name into `(goal_index, sub_index,
/// slug)`.
pub fn parse_spec_name(name: &str) -> Result<(u32, u32, String), SpecsError> {
    let caps = NAME_PATTERN
        .captures(name)
        .ok_or_else(|| SpecsError::InvalidName(name.to_string()))?;
    let goal_index: u32 = caps[1].parse().map_err(|_| SpecsError::InvalidName(name.to_string()))?;
    let sub_index: u32 = caps[2].parse().map_err(|_| SpecsError::InvalidName(name.to_string()))?;
    Ok((goal_index, sub_index, caps[3].to_string()))
}

/// Format a spec directory name from its components.
pub fn format_spec_name(goal_index: u32, sub_index: u32, slug: &str) -> String {
    format!("{goal_index:02}-{sub_index:02}-{slug}")
}

/// The next unused goal index, scanning already-bootstrapped spec names.
pub fn next_goal_index<'a>(existing_names: impl Iterator<Item = &'a str>) -> u32 {
    existing_names
        .filter_map(|name| parse_spec_name(name).ok())
        .map(|(goal_index, _, _)| goal_index)
        .max()
        .map(|max| max + 1)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;

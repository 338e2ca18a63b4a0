// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Goal identifier and the free-form goal entity.

crate::define_id! {
    /// Unique identifier for a goal, assigned when a batch or program
    /// decomposes a broader ask into individually schedulable goals.
    #[derive(Default)]
    pub struct GoalId;
}

/// A user- or decomposition-supplied goal.
///
/// Goals are produced once (by the user, or by §4.8 semantic decomposition)
/// and never mutated; `id` is absent until the goal enters a batch or
/// program schedule, at which point it is assigned a stable, sortable id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Goal {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GoalId>,
}

impl Goal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: GoalId) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
#[path = "goal_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Master/sub-spec identity and collaboration metadata.
//!
//! A spec is identified by a kebab-case name prefixed with two-part
//! numbering (`NN-NN-name`); the identifier is opaque here, parsing and
//! directory layout live in `ac-specs`.

use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

crate::define_id! {
    /// Identifier for a master or sub spec, e.g. `01-02-widget-catalog-api`.
    pub struct SpecId;
}

/// Whether a spec is the master spec for a decomposed goal, or one of its
/// children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    Master,
    Sub,
}

/// Current lifecycle status of a spec.
///
/// Transitions monotonically through `Planned -> Ready -> InProgress ->
/// {Blocked?, Completed, Failed}`. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecStatus {
    Planned,
    Ready,
    InProgress,
    Blocked,
    Completed,
    Failed,
}

impl SpecStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SpecStatus::Completed | SpecStatus::Failed)
    }

    /// Whether transitioning from `self` to `next` respects the monotonic
    /// ordering `Planned -> Ready -> InProgress -> {Blocked, Completed,
    /// Failed}`. `Blocked` may return to `InProgress`; every other forward
    /// step is one-way. A status "transitioning" to itself is a no-op and
    /// always allowed.
    pub fn can_transition_to(&self, next: SpecStatus) -> bool {
        use SpecStatus::*;
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Planned, Ready)
                | (Planned, InProgress)
                | (Ready, InProgress)
                | (InProgress, Blocked)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (Blocked, InProgress)
                | (Blocked, Failed)
                | (Blocked, Completed)
                | (Planned, Failed)
                | (Ready, Failed)
        )
    }
}

impl std::fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SpecStatus::Planned => "planned",
            SpecStatus::Ready => "ready",
            SpecStatus::InProgress => "in-progress",
            SpecStatus::Blocked => "blocked",
            SpecStatus::Completed => "completed",
            SpecStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Kind of dependency a sub-spec declares on another spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    RequiresCompletion,
    RequiresInterface,
    Optional,
}

/// A single declared dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub spec: SpecId,
    #[serde(rename = "type")]
    pub kind: DependencyType,
    pub reason: String,
}

/// Assignment of a spec to an executing agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub agent_id: String,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

/// Declared interfaces a spec provides to, or consumes from, its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interfaces {
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
}

/// Status envelope with its own timestamp, mirroring the on-disk
/// `collaboration.json#/status` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub current: SpecStatus,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Per-spec collaboration metadata (`collaboration.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    #[serde(rename = "type")]
    pub kind: SpecKind,
    pub master_spec: Option<SpecId>,
    #[serde(default)]
    pub sub_specs: Vec<SpecId>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
    pub status: StatusEnvelope,
    #[serde(default)]
    pub interfaces: Interfaces,
}

impl Collaboration {
    pub fn new_master(sub_specs: Vec<SpecId>, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            kind: SpecKind::Master,
            master_spec: None,
            sub_specs,
            dependencies: Vec::new(),
            assignment: None,
            status: StatusEnvelope {
                current: SpecStatus::Planned,
                updated_at: now,
            },
            interfaces: Interfaces::default(),
        }
    }

    pub fn new_sub(
        master: SpecId,
        dependencies: Vec<Dependency>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            kind: SpecKind::Sub,
            master_spec: Some(master),
            sub_specs: Vec::new(),
            dependencies,
            assignment: None,
            status: StatusEnvelope {
                current: SpecStatus::Planned,
                updated_at: now,
            },
            interfaces: Interfaces::default(),
        }
    }

    /// Attempt a status transition, enforcing monotonicity (§3 invariant).
    pub fn transition(
        &mut self,
        next: SpecStatus,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), CoreError> {
        if !self.status.current.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                from: self.status.current,
                to: next,
            });
        }
        self.status.current = next;
        self.status.updated_at = now;
        Ok(())
    }
}

/// Validate that a dependency graph over specs is acyclic (§3 invariant,
/// §4.5/§9 "cyclic collaboration graphs -> acyclic graph invariant +
/// detection").
///
/// `graph` maps each spec to the specs it depends on. Returns the first
/// cycle found as a list of spec ids, or `Ok(())` if none exists.
pub fn check_acyclic(graph: &HashMap<SpecId, Vec<SpecId>>) -> Result<(), CoreError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit(
        node: &SpecId,
        graph: &HashMap<SpecId, Vec<SpecId>>,
        marks: &mut HashMap<SpecId, Mark>,
        path: &mut Vec<SpecId>,
    ) -> Result<(), CoreError> {
        match marks.get(node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|s| s == node).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(node.clone());
                return Err(CoreError::CyclicDependency { cycle });
            }
            None => {}
        }
        marks.insert(node.clone(), Mark::Visiting);
        path.push(node.clone());
        if let Some(deps) = graph.get(node) {
            for dep in deps {
                visit(dep, graph, marks, path)?;
            }
        }
        path.pop();
        marks.insert(node.clone(), Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut path = Vec::new();
    let mut seen: HashSet<&SpecId> = HashSet::new();
    for node in graph.keys() {
        if seen.insert(node) {
            visit(node, graph, &mut marks, &mut path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SpecBundle`: the on-disk directory for one master or sub spec (§3).
//!
//! Grounded on `ac_storage::atomic`'s write-temp-then-rename pattern for
//! `collaboration.json`; the markdown documents are written directly since
//! they are append-only drafts an agent later edits, not state this crate
//! owns exclusively.

use std::path::{Path, PathBuf};

use ac_core::spec::Collaboration;
use ac_core::SpecId;
use ac_storage::{read_json_strict, write_json};

use crate::error::SpecsError;
use crate::template::{render_design, render_requirements, render_tasks};

/// The three required documents plus the optional directories/file a spec
/// bundle may carry (§3).
pub const REQUIRED_DOCS: &[&str] = &["requirements.md", "design.md", "tasks.md"];

/// Handle to one spec's directory under the project root.
#[derive(Debug, Clone)]
pub struct SpecBundle {
    root: PathBuf,
    id: SpecId,
}

/// Completion state of a spec's `tasks.md` checkbox lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCompletion {
    pub total: u32,
    pub closed: u32,
}

impl TaskCompletion {
    /// `tasks-closed` (§4.6 GATE): true when every checkbox is checked (a
    /// spec with zero checkboxes is vacuously not closed — there is
    /// nothing to measure completion against).
    pub fn is_closed(&self) -> bool {
        self.total > 0 && self.closed == self.total
    }

    pub fn rate_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.closed as f64 / self.total as f64) * 100.0
        }
    }
}

impl SpecBundle {
    pub fn new(root: &Path, id: SpecId) -> Self {
        Self {
            root: root.to_path_buf(),
            id,
        }
    }

    pub fn id(&self) -> &SpecId {
        &self.id
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(self.id.as_str())
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.path().join("requirements.md")
    }

    pub fn design_path(&self) -> PathBuf {
        self.path().join("design.md")
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.path().join("tasks.md")
    }

    pub fn collaboration_path(&self) -> PathBuf {
        self.path().join("collaboration.json")
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.path().join("docs")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.path().join("scripts")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.path().join("reports")
    }

    pub fn scene_package_path(&self) -> PathBuf {
        self.path().join("scene-package.json")
    }

    /// Write the skeleton `requirements.md`/`design.md`/`tasks.md` for a
    /// freshly bootstrapped spec. Does not overwrite documents that
    /// already exist, so re-running bootstrap on a resumed close-loop is
    /// idempotent.
    pub fn write_skeleton(&self, goal_text: &str) -> Result<(), SpecsError> {
        std::fs::create_dir_all(self.path())?;
        write_if_absent(&self.requirements_path(), &render_requirements(goal_text, self.id.as_str()))?;
        write_if_absent(&self.design_path(), &render_design(goal_text, self.id.as_str()))?;
        write_if_absent(&self.tasks_path(), &render_tasks(self.id.as_str()))?;
        Ok(())
    }

    /// `docs gate` (§4.6 GATE): every required doc is present.
    pub fn required_docs_present(&self) -> bool {
        REQUIRED_DOCS.iter().all(|doc| self.path().join(doc).exists())
    }

    /// Parse `tasks.md`'s `- [ ]`/`- [x]` checkbox lines.
    pub fn task_completion(&self) -> Result<TaskCompletion, SpecsError> {
        let path = self.tasks_path();
        if !path.exists() {
            return Ok(TaskCompletion::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut completion = TaskCompletion::default();
        for line in content.lines() {
            let trimmed = line.trim_start();
            if let Some(rest) = trimmed.strip_prefix("- [") {
                match rest.chars().next() {
                    Some(' ') => completion.total += 1,
                    Some('x') | Some('X') => {
                        completion.total += 1;
                        completion.closed += 1;
                    }
                    _ => {}
                }
            }
        }
        Ok(completion)
    }

    pub fn load_collaboration(&self) -> Result<Option<Collaboration>, SpecsError> {
        Ok(read_json_strict(&self.collaboration_path())?)
    }

    pub fn save_collaboration(&self, collaboration: &Collaboration) -> Result<(), SpecsError> {
        write_json(&self.collaboration_path(), collaboration)?;
        Ok(())
    }
}

fn write_if_absent(path: &Path, content: &str) -> Result<(), SpecsError> {
    if path.exists() {
        return Ok(());
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;

//! `auto session {list|stats|prune}` against an empty, just-created project.

use crate::prelude::*;

#[test]
fn list_on_empty_project_reports_none() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["session", "list"]))
        .passes()
        .stdout_has("no close-loop sessions");
}

#[test]
fn stats_on_empty_project_is_all_zero() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["session", "stats", "--json"]))
        .passes()
        .stdout_has("\"total\": 0");
}

#[test]
fn batch_session_and_close_loop_session_are_independent_kinds() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["batch-session", "list"]))
        .passes()
        .stdout_has("no batch sessions");
    project
        .scoped(auto().args(&["controller-session", "list"]))
        .passes()
        .stdout_has("no controller sessions");
}

#[test]
fn prune_on_empty_project_removes_nothing() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["session", "prune", "--json"]))
        .passes()
        .stdout_has("\"removed\": 0");
}

#[test]
fn dry_run_prune_does_not_touch_the_archive() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["--dry-run", "session", "prune"]))
        .passes()
        .stdout_has("dry-run: would prune close-loop sessions");
}

//! `auto recovery-memory {show|scopes|prune|clear}` on a project with no
//! recovery history.

use crate::prelude::*;

#[test]
fn show_on_empty_project_reports_none() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["recovery-memory", "show"]))
        .passes()
        .stdout_has("no recovery-memory entries");
}

#[test]
fn scopes_on_empty_project_is_an_empty_json_list() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["recovery-memory", "scopes", "--json"]))
        .passes()
        .stdout_has("[]");
}

#[test]
fn clear_on_empty_project_removes_nothing() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["recovery-memory", "clear", "--this-project"]))
        .passes();
}

#[test]
fn dry_run_clear_short_circuits() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["--dry-run", "recovery-memory", "clear"]))
        .passes()
        .stdout_has("dry-run: would remove recovery-memory entries");
}

#[test]
fn dry_run_prune_short_circuits() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["--dry-run", "recovery-memory", "prune"]))
        .passes()
        .stdout_has("dry-run: would remove recovery-memory entries");
}

//! `auto schema {check|migrate}` against a project with no session files.

use crate::prelude::*;

#[test]
fn check_on_empty_project_reports_no_drift() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["schema", "check", "--json"]))
        .passes()
        .stdout_has("\"drift\": []");
}

#[test]
fn migrate_on_empty_project_migrates_nothing() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["schema", "migrate", "--json"]))
        .passes()
        .stdout_has("\"migrated\": 0");
}

#[test]
fn dry_run_migrate_short_circuits() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["--dry-run", "schema", "migrate"]))
        .passes()
        .stdout_has("dry-run: would migrate lagging session snapshots");
}

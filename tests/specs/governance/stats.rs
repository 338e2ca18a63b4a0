//! `auto governance stats` on a project with no session history.

use crate::prelude::*;

#[test]
fn empty_project_is_low_risk_and_gate_ready() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["governance", "stats", "--json"]))
        .passes()
        .stdout_has("\"risk_level\": \"low\"")
        .stdout_has("\"release_gate_ready\": true");
}

#[test]
fn text_output_reports_risk_line() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["governance", "stats"]))
        .passes()
        .stdout_has("risk: low (release-gate-ready: true)");
}

#[test]
fn maintain_without_execute_flag_only_plans() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["governance", "maintain", "--json"]))
        .passes()
        .stdout_has("\"applied\": []");
}

#[test]
fn dry_run_maintain_short_circuits() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["--dry-run", "governance", "maintain", "--execute"]))
        .passes()
        .stdout_has("dry-run: would apply the governance plan");
}

#[test]
fn close_loop_reaches_target_risk_immediately_when_already_low() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["governance", "close-loop", "--json"]))
        .passes()
        .stdout_has("\"stop_reason\": \"target-risk-reached\"");
}

//! `auto handoff {plan|run|regression|gate-index|queue|template-diff|capability-matrix|evidence}`.

use crate::prelude::*;

#[test]
fn plan_with_no_signals_passes_the_gate() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "plan"]))
        .passes()
        .stdout_has("release gate: pass");
}

#[test]
fn regression_over_threshold_blocks() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "regression", "--count", "5"]))
        .fails()
        .stdout_has("release gate: blocked")
        .stdout_has("handoff-moqui-matrix-regressions-over-gate:5/0");
}

#[test]
fn regression_at_zero_passes() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "regression", "--count", "0"]))
        .passes()
        .stdout_has("release gate: pass");
}

#[test]
fn run_records_evidence_and_then_evidence_lists_it() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "run"]))
        .passes()
        .stdout_has("release gate: pass");

    let listed = project.scoped(auto().args(&["handoff", "evidence"])).passes();
    let stdout = listed.stdout();
    assert!(
        !stdout.contains("no release-evidence entries"),
        "expected a recorded entry, got: {stdout}"
    );
}

#[test]
fn dry_run_run_gate_does_not_record_evidence() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["--dry-run", "handoff", "run"]))
        .passes()
        .stdout_has("dry-run: would evaluate the release gate and record evidence");

    project
        .scoped(auto().args(&["handoff", "evidence"]))
        .passes()
        .stdout_has("no release-evidence entries");
}

#[test]
fn queue_on_a_default_manifest_has_no_gaps() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "queue"]))
        .passes()
        .stdout_has("no outstanding handoff gaps");
}

#[test]
fn template_diff_on_a_default_manifest_is_missing_every_required_doc() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "template-diff"]))
        .passes()
        .stdout_has("missing: requirements.md")
        .stdout_has("missing: design.md")
        .stdout_has("missing: tasks.md");
}

#[test]
fn capability_matrix_with_no_text_sources_reports_nothing_inferred() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "capability-matrix"]))
        .passes()
        .stdout_has("inferred: []");
}

#[test]
fn gate_index_reports_default_thresholds() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["handoff", "gate-index"]))
        .passes()
        .stdout_has("max-matrix-regressions: 0")
        .stdout_has("max-unknown-capabilities: 0");
}

//! CLI error handling: unknown subcommands and missing arguments.

use crate::prelude::*;

#[test]
fn unknown_subcommand_fails() {
    auto().args(&["not-a-real-command"]).fails();
}

#[test]
fn unknown_risk_level_is_a_usage_error() {
    let project = Project::empty();
    project
        .scoped(auto().args(&["governance", "close-loop", "--target-risk", "catastrophic"]))
        .fails()
        .code_eq(1)
        .stderr_has("unknown risk level");
}

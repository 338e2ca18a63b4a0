//! Top-level CLI help and version output.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_fails() {
    // clap requires a subcommand; running bare is a usage error, not success.
    auto().fails().stderr_has("Usage:");
}

#[test]
fn help_shows_usage() {
    auto().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn help_lists_close_loop_family() {
    auto()
        .args(&["--help"])
        .passes()
        .stdout_has("close-loop")
        .stdout_has("governance")
        .stdout_has("handoff");
}

#[test]
fn version_shows_version() {
    auto().args(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn session_help_shows_subcommands() {
    auto()
        .args(&["session", "--help"])
        .passes()
        .stdout_has("list")
        .stdout_has("stats")
        .stdout_has("prune");
}

#[test]
fn governance_help_shows_subcommands() {
    auto()
        .args(&["governance", "--help"])
        .passes()
        .stdout_has("stats")
        .stdout_has("maintain")
        .stdout_has("close-loop");
}

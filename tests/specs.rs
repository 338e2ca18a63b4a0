//! Behavioral specifications for the `auto` CLI.
//!
//! Black-box: these tests invoke the `auto` binary and verify stdout,
//! stderr, and exit codes against a temporary project directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

#[path = "specs/session/list_and_stats.rs"]
mod session_list_and_stats;

#[path = "specs/governance/stats.rs"]
mod governance_stats;

#[path = "specs/recovery_memory/show_and_clear.rs"]
mod recovery_memory_show_and_clear;

#[path = "specs/schema/check_and_migrate.rs"]
mod schema_check_and_migrate;

#[path = "specs/handoff/gate.rs"]
mod handoff_gate;

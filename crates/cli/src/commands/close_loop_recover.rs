// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto close-loop-recover [summary]`: derive a failure signature from a
//! close-loop summary and select (and optionally run) a remediation
//! action via recovery memory (§4.2).
//!
//! Grounded on [`ac_storage::RecoveryStore`] rather than session replay:
//! `CloseLoopRunner::run` always restarts at `DECOMPOSE` and session
//! events don't carry enough state to reconstruct a full
//! `OrchestrationSummary`, so "recover" means "pick and try the next
//! remediation command", not "resume the state machine mid-flight".

use std::path::PathBuf;
use std::time::Duration;

use ac_core::{ActionSource, FailureSignature, RecoveryScope, SystemClock};
use ac_storage::{default_recovery_root, RecoveryStore, DEFAULT_TTL_DAYS};
use clap::Args;
use serde::Serialize;

use crate::error::CliError;
use crate::output::{emit, OutputFormat};

#[derive(Debug, Args)]
pub struct CloseLoopRecoverArgs {
    /// Failure summary text (e.g. the tests-gate stderr excerpt or a gate
    /// verdict's reasons, joined).
    pub summary: String,

    #[arg(long, default_value = "generic")]
    pub error_class: String,

    /// Candidate remediation commands, one per occurrence, in index order.
    #[arg(long = "action", required = true)]
    pub actions: Vec<String>,

    #[arg(long, default_value_t = 0)]
    pub default_action: usize,

    #[arg(long, default_value_t = 900)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_TTL_DAYS)]
    pub ttl_days: u32,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct RecoverReport {
    scope: String,
    signature: String,
    action_index: usize,
    action_command: String,
    source: String,
    explanation: String,
    ran: bool,
    passed: Option<bool>,
}

pub async fn run(args: CloseLoopRecoverArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let clock = SystemClock;
    let scope = RecoveryScope::for_project(&project_root);
    let signature = FailureSignature::derive(&args.error_class, &args.summary);
    let store = RecoveryStore::new(default_recovery_root(&project_root));

    let available: Vec<usize> = (0..args.actions.len()).collect();
    let selected = store.select_action(&scope, &signature, &available, args.default_action)?;

    let action_command = args
        .actions
        .get(selected.action_index)
        .cloned()
        .ok_or_else(|| CliError::Usage(format!("no action at index {}", selected.action_index)))?;

    let outcome = ac_shell::run_test_gate(&action_command, &project_root, Duration::from_secs(args.timeout_secs)).await;
    let passed = match &outcome {
        Ok(result) => result.passed,
        Err(_) => false,
    };

    store.record_outcome(&scope, &signature, selected.action_index, passed, args.ttl_days, &clock)?;

    let source = match selected.source {
        ActionSource::Memory => "memory",
        ActionSource::Default => "default",
        ActionSource::Explicit => "explicit",
    };

    let report = RecoverReport {
        scope: scope.as_str().to_string(),
        signature: signature.as_str().to_string(),
        action_index: selected.action_index,
        action_command,
        source: source.to_string(),
        explanation: selected.explanation,
        ran: true,
        passed: Some(passed),
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            println!(
                "recovery action #{} ({}): {} [{}]",
                report.action_index,
                report.source,
                if passed { "succeeded" } else { "failed" },
                report.explanation,
            );
        }
    }

    if !passed {
        return Err(CliError::PolicyViolation(format!(
            "remediation action #{} did not succeed",
            report.action_index
        )));
    }
    Ok(())
}

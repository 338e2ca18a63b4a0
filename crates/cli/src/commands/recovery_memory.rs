// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto recovery-memory {show|scopes|prune|clear}`: direct read/write
//! access to the `(scope, signature) -> RecoveryEntry` document backing
//! `close-loop-recover` (§4.2).

use std::path::PathBuf;

use ac_core::{RecoveryScope, SystemClock};
use ac_storage::{default_recovery_root, RecoveryStore, DEFAULT_TTL_DAYS};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{emit, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum RecoveryMemoryCommand {
    /// Dump remembered actions, optionally restricted to this project's scope.
    Show(RecoveryMemoryScopeArgs),
    /// List every scope with at least one remembered entry.
    Scopes(RecoveryMemoryProjectArgs),
    /// Drop entries unused for longer than the retention window.
    Prune(RecoveryMemoryPruneArgs),
    /// Drop every entry in scope, regardless of age.
    Clear(RecoveryMemoryScopeArgs),
}

#[derive(Debug, Args)]
pub struct RecoveryMemoryProjectArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct RecoveryMemoryScopeArgs {
    /// Restrict to this project's recovery scope instead of every scope on disk.
    #[arg(long)]
    pub this_project: bool,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct RecoveryMemoryPruneArgs {
    #[arg(long)]
    pub this_project: bool,

    #[arg(long, default_value_t = DEFAULT_TTL_DAYS)]
    pub older_than_days: u32,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct RecoveryEntryReport {
    action_index: usize,
    attempts: u32,
    successes: u32,
    success_rate: f64,
    last_used_at: chrono::DateTime<chrono::Utc>,
    ttl_days: u32,
}

pub fn run(command: RecoveryMemoryCommand, format: OutputFormat) -> Result<(), CliError> {
    match command {
        RecoveryMemoryCommand::Show(args) => show(args, format),
        RecoveryMemoryCommand::Scopes(args) => scopes(args, format),
        RecoveryMemoryCommand::Prune(args) => prune(args, format),
        RecoveryMemoryCommand::Clear(args) => clear(args, format),
    }
}

fn store_for(project_root: &PathBuf) -> Result<(PathBuf, RecoveryStore), CliError> {
    let project_root = project_root.canonicalize().unwrap_or_else(|_| project_root.clone());
    let store = RecoveryStore::new(default_recovery_root(&project_root));
    Ok((project_root, store))
}

fn show(args: RecoveryMemoryScopeArgs, format: OutputFormat) -> Result<(), CliError> {
    let (project_root, store) = store_for(&args.project_root)?;
    let scope = args.this_project.then(|| RecoveryScope::for_project(&project_root));
    let doc = store.show(scope.as_ref())?;

    let report: std::collections::BTreeMap<String, std::collections::BTreeMap<String, RecoveryEntryReport>> = doc
        .into_iter()
        .map(|(scope, signatures)| {
            let signatures = signatures
                .into_iter()
                .map(|(sig, entry)| {
                    (
                        sig,
                        RecoveryEntryReport {
                            action_index: entry.action_index,
                            attempts: entry.attempts,
                            successes: entry.successes,
                            success_rate: entry.success_rate(),
                            last_used_at: entry.last_used_at,
                            ttl_days: entry.ttl_days,
                        },
                    )
                })
                .collect();
            (scope, signatures)
        })
        .collect();

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            if report.is_empty() {
                println!("no recovery-memory entries");
            }
            for (scope, signatures) in &report {
                println!("{scope}:");
                for (sig, entry) in signatures {
                    println!(
                        "  {sig}: action #{} ({}/{} = {:.0}%)",
                        entry.action_index,
                        entry.successes,
                        entry.attempts,
                        entry.success_rate * 100.0,
                    );
                }
            }
        }
    }
    Ok(())
}

fn scopes(args: RecoveryMemoryProjectArgs, format: OutputFormat) -> Result<(), CliError> {
    let (_, store) = store_for(&args.project_root)?;
    let scopes = store.scopes()?;

    match format {
        OutputFormat::Json => emit(format, &scopes)?,
        OutputFormat::Text => {
            if scopes.is_empty() {
                println!("no scopes recorded");
            }
            for s in &scopes {
                println!("{s}");
            }
        }
    }
    Ok(())
}

fn prune(args: RecoveryMemoryPruneArgs, format: OutputFormat) -> Result<(), CliError> {
    let (project_root, store) = store_for(&args.project_root)?;
    let scope = args.this_project.then(|| RecoveryScope::for_project(&project_root));
    let removed = store.prune(scope.as_ref(), args.older_than_days, &SystemClock)?;

    match format {
        OutputFormat::Json => emit(format, &serde_json::json!({ "removed": removed }))?,
        OutputFormat::Text => println!("pruned {removed} recovery-memory entry(ies)"),
    }
    Ok(())
}

/// `clear` is `prune` with a zero-day retention window: every entry's age
/// is `>= 0` days, so `is_stale` is unconditionally true and the whole
/// scope (or document) empties out.
fn clear(args: RecoveryMemoryScopeArgs, format: OutputFormat) -> Result<(), CliError> {
    let (project_root, store) = store_for(&args.project_root)?;
    let scope = args.this_project.then(|| RecoveryScope::for_project(&project_root));
    let removed = store.prune(scope.as_ref(), 0, &SystemClock)?;

    match format {
        OutputFormat::Json => emit(format, &serde_json::json!({ "removed": removed }))?,
        OutputFormat::Text => println!("cleared {removed} recovery-memory entry(ies)"),
    }
    Ok(())
}

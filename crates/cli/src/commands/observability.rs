// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto observability snapshot`: a point-in-time cross-archive dashboard —
//! session counts per kind/status, recovery-memory scope count, and
//! release-evidence entry count. A read-only sibling of
//! [`super::governance`]'s health assessment, without the maintain loop.

use std::path::PathBuf;

use ac_core::{SessionKind, SessionStatus};
use ac_storage::{default_evidence_root, default_recovery_root, EvidenceLog, RecoveryStore, SessionArchive};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ObservabilityCommand {
    /// Current counts across every session kind, recovery memory, and release evidence.
    Snapshot(ObservabilityArgs),
}

#[derive(Debug, Args)]
pub struct ObservabilityArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize, Default)]
struct KindCounts {
    total: usize,
    running: usize,
    completed: usize,
    partial_failed: usize,
    failed: usize,
    interrupted: usize,
}

#[derive(Debug, Serialize)]
struct ObservabilitySnapshot {
    close_loop: KindCounts,
    batch: KindCounts,
    controller: KindCounts,
    governance: KindCounts,
    spec_artifact: KindCounts,
    recovery_memory_scopes: usize,
    release_evidence_entries: usize,
}

fn counts(archive: &SessionArchive, kind: SessionKind) -> Result<KindCounts, CliError> {
    let mut counts = KindCounts::default();
    for envelope in archive.list(kind)? {
        counts.total += 1;
        match envelope.status {
            SessionStatus::Running => counts.running += 1,
            SessionStatus::Completed => counts.completed += 1,
            SessionStatus::PartialFailed => counts.partial_failed += 1,
            SessionStatus::Failed => counts.failed += 1,
            SessionStatus::Interrupted => counts.interrupted += 1,
        }
    }
    Ok(counts)
}

pub fn run(command: ObservabilityCommand, format: OutputFormat) -> Result<(), CliError> {
    match command {
        ObservabilityCommand::Snapshot(args) => snapshot(args, format),
    }
}

fn snapshot(args: ObservabilityArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let config = AppConfig::load(&project_root)?;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    let recovery = RecoveryStore::new(default_recovery_root(&project_root));
    let evidence = EvidenceLog::new(default_evidence_root(&project_root));

    let report = ObservabilitySnapshot {
        close_loop: counts(&archive, SessionKind::CloseLoop)?,
        batch: counts(&archive, SessionKind::Batch)?,
        controller: counts(&archive, SessionKind::Controller)?,
        governance: counts(&archive, SessionKind::Governance)?,
        spec_artifact: counts(&archive, SessionKind::SpecArtifact)?,
        recovery_memory_scopes: recovery.scopes()?.len(),
        release_evidence_entries: evidence.list()?.len(),
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            println!("close-loop: {} total ({} completed)", report.close_loop.total, report.close_loop.completed);
            println!("batch: {} total ({} completed)", report.batch.total, report.batch.completed);
            println!("controller: {} total ({} completed)", report.controller.total, report.controller.completed);
            println!("governance: {} total ({} completed)", report.governance.total, report.governance.completed);
            println!("spec-artifact: {} total ({} completed)", report.spec_artifact.total, report.spec_artifact.completed);
            println!("recovery-memory scopes: {}", report.recovery_memory_scopes);
            println!("release-evidence entries: {}", report.release_evidence_entries);
        }
    }
    Ok(())
}

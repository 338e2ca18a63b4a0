// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto {session|spec-session|batch-session|controller-session} {list|stats|prune}`:
//! one implementation shared across the four session-kind verb families,
//! parameterized by [`SessionKind`].

use std::path::PathBuf;

use ac_core::{SessionId, SessionKind, SessionStatus};
use ac_storage::SessionArchive;
use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, format_time_ago, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List sessions of this kind, newest first.
    List(SessionListArgs),
    /// Aggregate status counts for this kind.
    Stats(SessionStatsArgs),
    /// Delete sessions older than a retention window.
    Prune(SessionPruneArgs),
}

#[derive(Debug, Args)]
pub struct SessionListArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct SessionStatsArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct SessionPruneArgs {
    #[arg(long, default_value_t = 20)]
    pub keep: usize,

    #[arg(long, default_value_t = 30)]
    pub older_than_days: u32,

    /// Session ids to never delete, regardless of age.
    #[arg(long = "protect")]
    pub protect: Vec<String>,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    session_id: String,
    status: String,
    started_at: chrono::DateTime<Utc>,
    ended_at: Option<chrono::DateTime<Utc>>,
    event_count: usize,
}

#[derive(Debug, Serialize, Default)]
struct SessionStats {
    total: usize,
    running: usize,
    completed: usize,
    partial_failed: usize,
    failed: usize,
    interrupted: usize,
}

pub async fn run(
    kind: SessionKind,
    command: SessionCommand,
    format: OutputFormat,
) -> Result<(), CliError> {
    match command {
        SessionCommand::List(args) => list(kind, args, format),
        SessionCommand::Stats(args) => stats(kind, args, format),
        SessionCommand::Prune(args) => prune(kind, args, format),
    }
}

fn archive_for(project_root: &PathBuf) -> Result<(PathBuf, SessionArchive), CliError> {
    let project_root = project_root.canonicalize().unwrap_or_else(|_| project_root.clone());
    let config = AppConfig::load(&project_root)?;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    Ok((project_root, archive))
}

fn list(kind: SessionKind, args: SessionListArgs, format: OutputFormat) -> Result<(), CliError> {
    let (_, archive) = archive_for(&args.project_root)?;
    let envelopes = archive.list(kind)?;
    let now = Utc::now();
    let summaries: Vec<SessionSummary> = envelopes
        .into_iter()
        .take(args.limit)
        .map(|e| SessionSummary {
            session_id: e.session_id.as_str().to_string(),
            status: e.status.to_string(),
            started_at: e.started_at,
            ended_at: e.ended_at,
            event_count: e.events.len(),
        })
        .collect();

    match format {
        OutputFormat::Json => emit(format, &summaries)?,
        OutputFormat::Text => {
            if summaries.is_empty() {
                println!("no {kind} sessions");
            }
            for s in &summaries {
                println!(
                    "{} {} {} ({} events)",
                    crate::color::status(&s.status),
                    s.session_id,
                    format_time_ago(s.started_at, now),
                    s.event_count,
                );
            }
        }
    }
    Ok(())
}

fn stats(kind: SessionKind, args: SessionStatsArgs, format: OutputFormat) -> Result<(), CliError> {
    let (_, archive) = archive_for(&args.project_root)?;
    let envelopes = archive.list(kind)?;
    let mut stats = SessionStats::default();
    stats.total = envelopes.len();
    for e in &envelopes {
        match e.status {
            SessionStatus::Running => stats.running += 1,
            SessionStatus::Completed => stats.completed += 1,
            SessionStatus::PartialFailed => stats.partial_failed += 1,
            SessionStatus::Failed => stats.failed += 1,
            SessionStatus::Interrupted => stats.interrupted += 1,
        }
    }

    match format {
        OutputFormat::Json => emit(format, &stats)?,
        OutputFormat::Text => {
            println!(
                "{kind}: {} total ({} completed, {} partial-failed, {} failed, {} running, {} interrupted)",
                stats.total, stats.completed, stats.partial_failed, stats.failed, stats.running, stats.interrupted,
            );
        }
    }
    Ok(())
}

fn prune(kind: SessionKind, args: SessionPruneArgs, format: OutputFormat) -> Result<(), CliError> {
    let (_, archive) = archive_for(&args.project_root)?;
    let protect: Vec<SessionId> = args.protect.into_iter().map(SessionId::new).collect();
    let removed = archive.prune(kind, args.keep, args.older_than_days, &protect, Utc::now())?;

    match format {
        OutputFormat::Json => emit(format, &serde_json::json!({ "removed": removed }))?,
        OutputFormat::Text => println!("pruned {removed} {kind} session(s)"),
    }
    Ok(())
}

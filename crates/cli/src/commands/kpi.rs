// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto kpi trend`: success-rate trend across close-loop and batch
//! sessions, bucketed by day. Not grounded on any single spec section —
//! the CLI surface names it with no further detail — so it reuses the
//! same archive-scan shape as [`super::session`] and [`super::governance`]
//! rather than inventing a new storage format.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ac_core::{SessionKind, SessionStatus};
use ac_storage::SessionArchive;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum KpiCommand {
    /// Daily success-rate trend for close-loop and batch sessions.
    Trend(KpiTrendArgs),
}

#[derive(Debug, Args)]
pub struct KpiTrendArgs {
    #[arg(long, default_value_t = 14)]
    pub days: u32,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct TrendBucket {
    date: String,
    total: usize,
    completed: usize,
    partial_failed: usize,
    failed: usize,
    success_rate: f64,
}

pub fn run(command: KpiCommand, format: OutputFormat) -> Result<(), CliError> {
    match command {
        KpiCommand::Trend(args) => trend(args, format),
    }
}

fn trend(args: KpiTrendArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let config = AppConfig::load(&project_root)?;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));

    let cutoff = chrono::Utc::now() - chrono::Duration::days(args.days as i64);
    let mut by_day: BTreeMap<String, (usize, usize, usize, usize)> = BTreeMap::new();

    for kind in [SessionKind::CloseLoop, SessionKind::Batch] {
        for envelope in archive.list(kind)? {
            if envelope.started_at < cutoff {
                continue;
            }
            let day = envelope.started_at.format("%Y-%m-%d").to_string();
            let bucket = by_day.entry(day).or_insert((0, 0, 0, 0));
            bucket.0 += 1;
            match envelope.status {
                SessionStatus::Completed => bucket.1 += 1,
                SessionStatus::PartialFailed => bucket.2 += 1,
                SessionStatus::Failed => bucket.3 += 1,
                SessionStatus::Running | SessionStatus::Interrupted => {}
            }
        }
    }

    let buckets: Vec<TrendBucket> = by_day
        .into_iter()
        .map(|(date, (total, completed, partial_failed, failed))| TrendBucket {
            date,
            total,
            completed,
            partial_failed,
            failed,
            success_rate: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64 * 100.0
            },
        })
        .collect();

    match format {
        OutputFormat::Json => emit(format, &buckets)?,
        OutputFormat::Text => {
            if buckets.is_empty() {
                println!("no sessions in the last {} day(s)", args.days);
            }
            for b in &buckets {
                println!(
                    "{}: {}/{} completed ({:.0}%), {} partial-failed, {} failed",
                    b.date, b.completed, b.total, b.success_rate, b.partial_failed, b.failed,
                );
            }
        }
    }
    Ok(())
}

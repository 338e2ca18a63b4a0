// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto close-loop-batch`: run N goals under a shared agent budget with
//! priority scheduling and round-based retry.

use std::path::PathBuf;

use ac_control::batch::{run_batch, BatchSummary, GoalStatus};
use ac_control::controller::parse_queue;
use ac_control::program::decompose_program_goal;
use ac_core::{Clock, Goal, SystemClock};
use ac_storage::SessionArchive;
use clap::Args;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};
use crate::ports::{build_adapter, new_session_id, CloseLoopGoalRunner};

#[derive(Debug, Args)]
pub struct CloseLoopBatchArgs {
    /// Goals to run, one per occurrence (`--goal a --goal b`).
    #[arg(long = "goal")]
    pub goals: Vec<String>,

    /// A file with one goal per line (blank lines and `#`-comments
    /// ignored), same format as the controller's queue file.
    pub goals_file: Option<PathBuf>,

    /// Re-run only the goals that didn't complete in a previous batch,
    /// read from that batch's JSON summary.
    #[arg(long = "resume-from-summary")]
    pub resume_from_summary: Option<PathBuf>,

    /// Split one broad goal into sub-goals by clause instead of taking
    /// goals verbatim.
    #[arg(long = "decompose-goal")]
    pub decompose_goal: Option<String>,

    #[arg(long = "batch-session-id")]
    pub batch_session_id: Option<String>,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

fn goals_from_args(args: &CloseLoopBatchArgs) -> Result<Vec<Goal>, CliError> {
    let mut texts = args.goals.clone();

    if let Some(path) = &args.goals_file {
        let content = std::fs::read_to_string(path)?;
        texts.extend(parse_queue(&content).map_err(CliError::from)?);
    }

    if let Some(path) = &args.resume_from_summary {
        let content = std::fs::read_to_string(path)?;
        let summary: BatchSummary = serde_json::from_str(&content)?;
        texts.extend(
            summary
                .goal_outcomes
                .into_iter()
                .filter(|o| o.status != GoalStatus::Completed)
                .map(|o| o.goal_text),
        );
    }

    if let Some(goal_text) = &args.decompose_goal {
        let decomposition = decompose_program_goal(&Goal { text: goal_text.clone(), id: None }, 0.6);
        texts.extend(decomposition.goals.into_iter().map(|g| g.text));
    }

    if texts.is_empty() {
        return Err(CliError::Usage(
            "close-loop-batch needs at least one of --goal, a goals file, --resume-from-summary, or --decompose-goal"
                .to_string(),
        ));
    }

    Ok(texts.into_iter().map(|text| Goal { text, id: None }).collect())
}

pub async fn run(args: CloseLoopBatchArgs, format: OutputFormat) -> Result<(), CliError> {
    let goals = goals_from_args(&args)?;
    let batch_session_id = args.batch_session_id.clone();

    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let config = AppConfig::load(&project_root)?;
    let clock = SystemClock;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    let adapter = build_adapter(&config);
    let batch_session = new_session_id(&clock, batch_session_id);

    let runner = CloseLoopGoalRunner {
        clock: clock.clone(),
        project_root,
        archive,
        adapter,
        config: config.clone(),
    };

    let summary = run_batch(runner, goals, config.batch_config(), batch_session).await?;

    match format {
        OutputFormat::Json => emit(format, &summary)?,
        OutputFormat::Text => {
            println!(
                "batch {}: {}/{} completed, {} partial-failed, {} failed ({:.0}% success)",
                summary.batch_session.as_str(),
                summary.metrics.completed,
                summary.goal_outcomes.len(),
                summary.metrics.partial_failed,
                summary.metrics.failed,
                summary.metrics.success_rate * 100.0,
            );
            for round in &summary.batch_retry {
                println!(
                    "  round {}: {} requeued, {} rate-limit signals{}",
                    round.round,
                    round.requeued,
                    round.rate_limit_signals_observed,
                    if round.halved_budget { " (budget halved)" } else { "" },
                );
            }
        }
    }

    if summary.metrics.failed > 0 && !config.continue_on_error {
        return Err(CliError::PolicyViolation(format!(
            "{} goal(s) failed in batch {}",
            summary.metrics.failed,
            summary.batch_session.as_str()
        )));
    }
    Ok(())
}

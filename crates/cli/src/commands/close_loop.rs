// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto close-loop "<goal>"`: drive a single goal through
//! DECOMPOSE -> BOOTSTRAP_SPECS -> ORCHESTRATE -> GATE -> (REPLAN | END).

use std::path::PathBuf;

use ac_control::batch::GoalStatus;
use ac_core::{Clock, Goal, SystemClock};
use ac_storage::SessionArchive;
use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};
use crate::ports::{build_adapter, new_session_id, CloseLoopGoalRunner};

#[derive(Debug, Args)]
pub struct CloseLoopArgs {
    /// The goal to decompose and drive to completion.
    pub goal: String,

    /// Pin the sub-spec count instead of letting the complexity score pick it.
    #[arg(long)]
    pub subs: Option<u8>,

    /// Use a specific session id instead of generating one.
    #[arg(long = "session-id")]
    pub session_id: Option<String>,

    /// Continue an existing session (identified by `--session-id`) instead
    /// of starting a new one. A no-op if that session already completed.
    #[arg(long)]
    pub resume: bool,

    /// When resuming, proceed even if the invoked flags differ from the
    /// ones the session was originally started with.
    #[arg(long = "allow-drift")]
    pub allow_drift: bool,

    /// Override the configured minimum per-cycle success rate.
    #[arg(long = "min-success-rate")]
    pub min_success_rate: Option<f64>,

    /// Override the configured maximum observed risk level
    /// (`low`/`medium`/`high`/`critical`).
    #[arg(long = "max-risk-level")]
    pub max_risk_level: Option<String>,

    /// Override the configured maximum success-rate drop vs. baseline.
    #[arg(long = "max-success-rate-drop")]
    pub max_success_rate_drop: Option<f64>,

    /// Override the configured replan strategy (`fixed`/`adaptive`).
    #[arg(long = "replan-strategy")]
    pub replan_strategy: Option<String>,

    /// Override the configured replan attempt budget.
    #[arg(long = "replan-attempts")]
    pub replan_attempts: Option<u32>,

    /// Override the configured adaptive no-progress window.
    #[arg(long = "no-progress-window")]
    pub no_progress_window: Option<u32>,

    /// Project root to operate on.
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

fn apply_overrides(mut config: AppConfig, args: &CloseLoopArgs) -> Result<AppConfig, CliError> {
    if let Some(rate) = args.min_success_rate {
        config.min_success_rate = rate;
    }
    if let Some(drop) = args.max_success_rate_drop {
        config.max_success_rate_drop = drop;
    }
    if let Some(name) = &args.max_risk_level {
        config.max_risk_level = match name.to_ascii_lowercase().as_str() {
            "low" => ac_control::release_gate::RiskLevel::Low,
            "medium" => ac_control::release_gate::RiskLevel::Medium,
            "high" => ac_control::release_gate::RiskLevel::High,
            "critical" => ac_control::release_gate::RiskLevel::Critical,
            other => return Err(CliError::Usage(format!("unknown risk level: {other}"))),
        };
    }
    if let Some(name) = &args.replan_strategy {
        config.replan_strategy_mode = match name.to_ascii_lowercase().as_str() {
            "fixed" => crate::config::ReplanStrategyMode::Fixed,
            "adaptive" => crate::config::ReplanStrategyMode::Adaptive,
            other => return Err(CliError::Usage(format!("unknown replan strategy: {other}"))),
        };
    }
    if let Some(attempts) = args.replan_attempts {
        config.replan_attempts = attempts;
    }
    if let Some(window) = args.no_progress_window {
        config.replan_no_progress_window = window;
    }
    Ok(config)
}

#[derive(Debug, Serialize)]
struct CloseLoopReport {
    goal: String,
    session_id: String,
    status: String,
    replan_cycles: u32,
    rate_limit_signals: u32,
    backoff_ms: u64,
    elapsed_secs: f64,
}

pub async fn run(args: CloseLoopArgs, format: OutputFormat) -> Result<(), CliError> {
    if args.resume && args.session_id.is_none() {
        return Err(CliError::Usage(
            "--resume requires --session-id to name the session to continue".to_string(),
        ));
    }
    let project_root = args.project_root.clone().canonicalize().unwrap_or(args.project_root.clone());
    let config = AppConfig::load(&project_root)?;
    let config = apply_overrides(config, &args)?;
    let clock = SystemClock;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    let adapter = build_adapter(&config);
    let session_id = new_session_id(&clock, args.session_id);
    let goal = Goal {
        text: args.goal,
        id: None,
    };

    let runner = CloseLoopGoalRunner {
        clock: clock.clone(),
        project_root,
        archive,
        adapter,
        config,
    };

    let outcome = runner
        .run_one(goal, session_id, args.subs, args.resume, args.allow_drift)
        .await
        .map_err(CliError::from)?;

    let report = CloseLoopReport {
        goal: outcome.goal_text,
        session_id: outcome.session_id.as_str().to_string(),
        status: match outcome.status {
            GoalStatus::Completed => "completed",
            GoalStatus::PartialFailed => "partial-failed",
            GoalStatus::Failed => "failed",
        }
        .to_string(),
        replan_cycles: outcome.replan_cycles,
        rate_limit_signals: outcome.rate_limit_signals,
        backoff_ms: outcome.backoff_ms,
        elapsed_secs: outcome.elapsed.as_secs_f64(),
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            println!(
                "{} {} ({} cycles, {}ms backoff)",
                crate::color::status(&report.status),
                report.session_id,
                report.replan_cycles,
                report.backoff_ms,
            );
        }
    }

    if outcome.status == GoalStatus::Failed {
        return Err(CliError::PolicyViolation(format!(
            "goal failed after {} replan cycles",
            report.replan_cycles
        )));
    }
    Ok(())
}

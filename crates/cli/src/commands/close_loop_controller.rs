// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto close-loop-controller`: long-running queue drainer, dispatching
//! each dequeued goal to a full program run.

use std::path::PathBuf;
use std::time::Duration;

use ac_control::controller::{run_controller, ControllerConfig, StopReason};
use ac_core::{SessionId, SystemClock};
use ac_storage::SessionArchive;
use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};
use crate::ports::{build_adapter, CloseLoopGoalRunner};

#[derive(Debug, Args)]
pub struct CloseLoopControllerArgs {
    /// Queue file: one goal per line (`#`-comments ignored) or a JSON array.
    #[arg(long)]
    pub queue: PathBuf,

    #[arg(long, default_value_t = 1)]
    pub dequeue_limit: usize,

    #[arg(long, default_value_t = true)]
    pub dedup: bool,

    #[arg(long)]
    pub wait_on_empty: bool,

    #[arg(long, default_value_t = 5)]
    pub poll_interval_secs: u64,

    #[arg(long)]
    pub max_cycles: Option<u32>,

    #[arg(long)]
    pub max_elapsed_secs: Option<u64>,

    #[arg(long)]
    pub stop_on_goal_failure: bool,

    #[arg(long, default_value_t = 600)]
    pub lease_ttl_secs: u64,

    #[arg(long)]
    pub resume_session: Option<String>,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Serialize)]
struct GoalOutcomeReport {
    goal_text: String,
    session_id: String,
    passed: bool,
}

#[derive(Debug, Serialize)]
struct ControllerReport {
    cycles_run: u32,
    done: Vec<GoalOutcomeReport>,
    failed: Vec<GoalOutcomeReport>,
    stop_reason: String,
}

fn report_stop_reason(reason: StopReason) -> &'static str {
    match reason {
        StopReason::QueueDrainedNoWait => "queue-drained-no-wait",
        StopReason::MaxCyclesReached => "max-cycles-reached",
        StopReason::MaxElapsedReached => "max-elapsed-reached",
        StopReason::GoalFailureStop => "goal-failure-stop",
        StopReason::LeaseBusy => "lease-busy",
    }
}

pub async fn run(args: CloseLoopControllerArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let config = AppConfig::load(&project_root)?;
    let clock = SystemClock;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    let adapter = build_adapter(&config);

    let controller_config = ControllerConfig {
        queue_path: args.queue,
        lease_path: config.state_dir_path(&project_root).join("controller.lease"),
        dequeue_limit: args.dequeue_limit,
        dedup: args.dedup,
        wait_on_empty: args.wait_on_empty,
        poll_interval: Duration::from_secs(args.poll_interval_secs),
        max_cycles: args.max_cycles,
        max_elapsed: args.max_elapsed_secs.map(Duration::from_secs),
        stop_on_goal_failure: args.stop_on_goal_failure,
        lease_ttl: Duration::from_secs(args.lease_ttl_secs),
    };

    let mut runner = CloseLoopGoalRunner {
        clock: clock.clone(),
        project_root,
        archive: archive.clone(),
        adapter,
        config,
    };

    let holder_id = format!("auto-controller-{}", std::process::id());
    let resume_session = args.resume_session.map(SessionId::new);

    let result = run_controller(
        &clock,
        &archive,
        &mut runner,
        controller_config,
        &holder_id,
        resume_session,
    )
    .await?;

    let report = ControllerReport {
        cycles_run: result.cycles_run,
        done: result
            .done
            .iter()
            .map(|o| GoalOutcomeReport {
                goal_text: o.goal_text.clone(),
                session_id: o.session_id.as_str().to_string(),
                passed: o.passed,
            })
            .collect(),
        failed: result
            .failed
            .iter()
            .map(|o| GoalOutcomeReport {
                goal_text: o.goal_text.clone(),
                session_id: o.session_id.as_str().to_string(),
                passed: o.passed,
            })
            .collect(),
        stop_reason: report_stop_reason(result.stop_reason).to_string(),
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            println!(
                "{} cycle(s), {} done, {} failed, stopped: {}",
                report.cycles_run,
                report.done.len(),
                report.failed.len(),
                report.stop_reason,
            );
        }
    }

    if result.stop_reason == StopReason::LeaseBusy {
        return Err(CliError::PolicyViolation("controller lease is held by another instance".to_string()));
    }
    if !report.failed.is_empty() && result.stop_reason == StopReason::GoalFailureStop {
        return Err(CliError::PolicyViolation(format!(
            "controller stopped after {} goal failure(s)",
            report.failed.len()
        )));
    }
    Ok(())
}

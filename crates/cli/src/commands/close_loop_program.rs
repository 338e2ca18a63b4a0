// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto close-loop-program "<goal>"`: decompose one broad goal into a
//! batch, execute it, and evaluate the Program Gate.

use std::path::PathBuf;

use ac_control::program::{run_program, GateProfile, ProgramConfig};
use ac_control::release_gate::RiskLevel;
use ac_core::{Clock, Goal, SystemClock};
use ac_storage::SessionArchive;
use clap::Args;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};
use crate::ports::{build_adapter, new_session_id, CloseLoopGoalRunner};

fn parse_profile(name: &str) -> Result<GateProfile, CliError> {
    match name.to_ascii_lowercase().as_str() {
        "default" => Ok(GateProfile::Default),
        "dev" => Ok(GateProfile::Dev),
        "staging" => Ok(GateProfile::Staging),
        "prod" => Ok(GateProfile::Prod),
        "moqui" => Ok(GateProfile::Moqui),
        "enterprise" => Ok(GateProfile::Enterprise),
        other => Err(CliError::Usage(format!("unknown gate profile: {other}"))),
    }
}

fn parse_risk(name: &str) -> Result<RiskLevel, CliError> {
    match name.to_ascii_lowercase().as_str() {
        "low" => Ok(RiskLevel::Low),
        "medium" => Ok(RiskLevel::Medium),
        "high" => Ok(RiskLevel::High),
        "critical" => Ok(RiskLevel::Critical),
        other => Err(CliError::Usage(format!("unknown risk level: {other}"))),
    }
}

#[derive(Debug, Args)]
pub struct CloseLoopProgramArgs {
    pub goal: String,

    #[arg(long, default_value = "default")]
    pub profile: String,

    /// Comma-separated fallback profiles tried in order if `--profile` fails.
    #[arg(long, default_value = "")]
    pub fallback: String,

    #[arg(long, default_value = "low")]
    pub observed_risk: String,

    #[arg(long = "batch-session-id")]
    pub batch_session_id: Option<String>,

    #[arg(long)]
    pub subs: Option<u8>,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

pub async fn run(args: CloseLoopProgramArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let config = AppConfig::load(&project_root)?;
    let clock = SystemClock;
    let archive = SessionArchive::new(config.state_dir_path(&project_root));
    let adapter = build_adapter(&config);
    let batch_session = new_session_id(&clock, args.batch_session_id);

    let primary_profile = parse_profile(&args.profile)?;
    let fallback_chain = args
        .fallback
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_profile)
        .collect::<Result<Vec<_>, _>>()?;
    let observed_risk = parse_risk(&args.observed_risk)?;

    let program_config = ProgramConfig {
        batch: config.batch_config(),
        min_decomposition_quality: config.min_decomposition_quality,
        primary_profile,
        fallback_chain,
        sub_override: args.subs,
    };

    let runner = CloseLoopGoalRunner {
        clock: clock.clone(),
        project_root,
        archive,
        adapter,
        config,
    };

    let goal = Goal {
        text: args.goal,
        id: None,
    };

    let result = run_program(runner, goal, program_config, batch_session, observed_risk).await?;

    match format {
        OutputFormat::Json => emit(format, &result)?,
        OutputFormat::Text => {
            println!(
                "decomposed into {} sub-goal(s) (quality {:.2}{})",
                result.decomposition.goals.len(),
                result.decomposition.quality_score,
                if result.decomposition.refined { ", refined" } else { "" },
            );
            println!(
                "program gate: {} (profile {:?}{})",
                if result.gate_verdict.passed { "pass" } else { "blocked" },
                result.gate_verdict.profile_used,
                if result.gate_verdict.passed_on_fallback { ", via fallback" } else { "" },
            );
            for reason in &result.gate_verdict.reasons {
                println!("  - {reason}");
            }
            for rec in &result.remediation {
                println!("  try: {rec}");
            }
        }
    }

    if !result.gate_verdict.passed {
        return Err(CliError::PolicyViolation(format!(
            "program gate blocked: {}",
            result.gate_verdict.reasons.join(", ")
        )));
    }
    Ok(())
}

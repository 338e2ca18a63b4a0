// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto governance {stats|maintain|close-loop|session *}`: cross-archive
//! health assessment and the bounded maintain-then-advise loop (§4.10).

use std::path::PathBuf;

use ac_control::governance::{
    plan_from_assessment, run_governance_loop, ActionResult, AdvisoryAction, GovernanceMode,
    GovernancePlan, HandoffSignals, HealthAssessment, HealthAssessor, MaintenanceAction,
    PlanExecutor, StopReason,
};
use ac_control::release_gate::RiskLevel;
use ac_core::{RecoveryScope, SessionKind, SessionStatus, SystemClock};
use ac_storage::{default_recovery_root, RecoveryStore, ResumeSelector, SessionArchive};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{emit, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum GovernanceCommand {
    /// One-shot health assessment, no mutation.
    Stats(GovernanceArgs),
    /// Plan and (optionally) apply maintenance/advisory actions, once.
    Maintain(GovernanceMaintainArgs),
    /// Run the bounded `(maintain -> gate -> batch?)` loop until stable.
    CloseLoop(GovernanceLoopArgs),
}

#[derive(Debug, Args)]
pub struct GovernanceArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct GovernanceMaintainArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    #[arg(long)]
    pub execute: bool,

    #[arg(long)]
    pub execute_advisory: bool,
}

#[derive(Debug, Args)]
pub struct GovernanceLoopArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    #[arg(long, default_value = "low")]
    pub target_risk: String,

    #[arg(long, default_value_t = 5)]
    pub max_rounds: u32,

    #[arg(long)]
    pub execute: bool,

    #[arg(long)]
    pub execute_advisory: bool,
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

/// Scans the session archive and recovery memory to build a
/// [`HealthAssessment`]. Thresholds are coarse backlog counts rather than
/// statistical models, matching the rest of this crate's "explainable over
/// clever" bias.
struct ArchiveHealthAssessor {
    archive: SessionArchive,
    recovery: RecoveryStore,
    scope: RecoveryScope,
}

fn backlog(archive: &SessionArchive, kind: SessionKind) -> Result<usize, CliError> {
    Ok(archive
        .list(kind)?
        .iter()
        .filter(|e| e.status != SessionStatus::Completed)
        .count())
}

impl HealthAssessor for ArchiveHealthAssessor {
    fn assess(&mut self) -> HealthAssessment {
        let mut concerns = Vec::new();

        let close_loop_backlog = backlog(&self.archive, SessionKind::CloseLoop).unwrap_or(0);
        if close_loop_backlog > 5 {
            concerns.push(format!("session backlog:{close_loop_backlog}"));
        }
        let batch_backlog = backlog(&self.archive, SessionKind::Batch).unwrap_or(0);
        if batch_backlog > 3 {
            concerns.push(format!("batch-session backlog:{batch_backlog}"));
        }
        let controller_backlog = backlog(&self.archive, SessionKind::Controller).unwrap_or(0);
        if controller_backlog > 1 {
            concerns.push(format!("controller-session backlog:{controller_backlog}"));
        }

        let scoped_entries = self
            .recovery
            .show(Some(&self.scope))
            .ok()
            .and_then(|doc| doc.into_values().next())
            .map(|signatures| signatures.len())
            .unwrap_or(0);
        if scoped_entries > 20 {
            concerns.push(format!("recovery-memory size growing:{scoped_entries}"));
        }

        let recoverable = self
            .archive
            .resume(SessionKind::CloseLoop, &ResumeSelector::Interrupted)
            .ok()
            .flatten()
            .is_some();
        if recoverable {
            concerns.push("recoverable-failure detected".to_string());
        }

        let controller_stalled = self
            .archive
            .resume(SessionKind::Controller, &ResumeSelector::Interrupted)
            .ok()
            .flatten()
            .is_some();
        if controller_stalled {
            concerns.push("controller-stalled".to_string());
        }

        let risk_level = match concerns.len() {
            0 => RiskLevel::Low,
            1..=2 => RiskLevel::Medium,
            3..=4 => RiskLevel::High,
            _ => RiskLevel::Critical,
        };

        let handoff_signals = HandoffSignals {
            capability_unknowns: 0,
            matrix_regressions: 0,
            weekly_ops_pressure: 0.0,
        };

        HealthAssessment {
            release_gate_ready: risk_level <= RiskLevel::Medium,
            recommendations: concerns.iter().map(|c| format!("address: {c}")).collect(),
            risk_level,
            concerns,
            handoff_signals,
        }
    }
}

struct ArchivePlanExecutor {
    archive: SessionArchive,
    recovery: RecoveryStore,
    scope: RecoveryScope,
    clock: SystemClock,
}

impl PlanExecutor for ArchivePlanExecutor {
    fn apply_maintenance(&mut self, action: MaintenanceAction) -> ActionResult {
        let now = chrono::Utc::now();
        let outcome = match action {
            MaintenanceAction::SessionPrune => {
                self.archive.prune(SessionKind::CloseLoop, 20, 30, &[], now)
            }
            MaintenanceAction::BatchSessionPrune => {
                self.archive.prune(SessionKind::Batch, 20, 30, &[], now)
            }
            MaintenanceAction::ControllerSessionPrune => {
                self.archive.prune(SessionKind::Controller, 10, 30, &[], now)
            }
            MaintenanceAction::RecoveryMemoryPrune => self.recovery.prune(Some(&self.scope), 30, &self.clock),
        };
        match outcome {
            Ok(_) => ActionResult::Applied,
            Err(_) => ActionResult::Failed,
        }
    }

    fn execute_advisory(&mut self, action: AdvisoryAction) -> ActionResult {
        let kind = match action {
            AdvisoryAction::RecoverLatest => SessionKind::CloseLoop,
            AdvisoryAction::ControllerResumeLatest => SessionKind::Controller,
        };
        match self.archive.resume(kind, &ResumeSelector::Interrupted) {
            Ok(Some(_)) => ActionResult::Applied,
            Ok(None) => ActionResult::Skipped,
            Err(_) => ActionResult::Failed,
        }
    }
}

#[derive(Debug, Serialize)]
struct AssessmentReport {
    risk_level: String,
    concerns: Vec<String>,
    recommendations: Vec<String>,
    release_gate_ready: bool,
    plan: GovernancePlanReport,
}

#[derive(Debug, Serialize)]
struct GovernancePlanReport {
    maintenance: Vec<String>,
    advisory: Vec<String>,
}

fn risk_label(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
        RiskLevel::Critical => "critical",
    }
}

fn plan_report(plan: &GovernancePlan) -> GovernancePlanReport {
    GovernancePlanReport {
        maintenance: plan.maintenance.iter().map(|a| format!("{a:?}")).collect(),
        advisory: plan.advisory.iter().map(|a| format!("{a:?}")).collect(),
    }
}

fn build_assessor(project_root: &std::path::Path) -> Result<(ArchiveHealthAssessor, AppConfig), CliError> {
    let config = AppConfig::load(project_root)?;
    let archive = SessionArchive::new(config.state_dir_path(project_root));
    let recovery = RecoveryStore::new(default_recovery_root(project_root));
    let scope = RecoveryScope::for_project(project_root);
    Ok((
        ArchiveHealthAssessor {
            archive,
            recovery,
            scope,
        },
        config,
    ))
}

pub fn run(command: GovernanceCommand, format: OutputFormat) -> Result<(), CliError> {
    match command {
        GovernanceCommand::Stats(args) => stats(args, format),
        GovernanceCommand::Maintain(args) => maintain(args, format),
        GovernanceCommand::CloseLoop(args) => close_loop(args, format),
    }
}

fn stats(args: GovernanceArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let (mut assessor, _config) = build_assessor(&project_root)?;
    let assessment = assessor.assess();
    let plan = plan_from_assessment(&assessment);

    let report = AssessmentReport {
        risk_level: risk_label(assessment.risk_level).to_string(),
        concerns: assessment.concerns,
        recommendations: assessment.recommendations,
        release_gate_ready: assessment.release_gate_ready,
        plan: plan_report(&plan),
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            println!(
                "risk: {} (release-gate-ready: {})",
                report.risk_level, report.release_gate_ready
            );
            for c in &report.concerns {
                println!("  concern: {c}");
            }
        }
    }
    Ok(())
}

fn maintain(args: GovernanceMaintainArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let (mut assessor, config) = build_assessor(&project_root)?;
    let assessment = assessor.assess();
    let plan = plan_from_assessment(&assessment);

    let mut applied = Vec::new();
    if args.execute {
        let mut executor = ArchivePlanExecutor {
            archive: SessionArchive::new(config.state_dir_path(&project_root)),
            recovery: RecoveryStore::new(default_recovery_root(&project_root)),
            scope: RecoveryScope::for_project(&project_root),
            clock: SystemClock,
        };
        for action in &plan.maintenance {
            applied.push((format!("{action:?}"), executor.apply_maintenance(*action)));
        }
        if args.execute_advisory {
            for action in &plan.advisory {
                applied.push((format!("{action:?}"), executor.execute_advisory(*action)));
            }
        }
    }

    match format {
        OutputFormat::Json => emit(
            format,
            &serde_json::json!({
                "risk_level": risk_label(assessment.risk_level),
                "plan": plan_report(&plan),
                "applied": applied.iter().map(|(a, r)| serde_json::json!({ "action": a, "result": format!("{r:?}") })).collect::<Vec<_>>(),
            }),
        )?,
        OutputFormat::Text => {
            println!("plan: {:?}", plan_report(&plan));
            for (action, result) in &applied {
                println!("  {action}: {result:?}");
            }
        }
    }
    Ok(())
}

fn close_loop(args: GovernanceLoopArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let target_risk = parse_risk(&args.target_risk)?;
    let (mut assessor, config) = build_assessor(&project_root)?;
    let mut executor = ArchivePlanExecutor {
        archive: SessionArchive::new(config.state_dir_path(&project_root)),
        recovery: RecoveryStore::new(default_recovery_root(&project_root)),
        scope: RecoveryScope::for_project(&project_root),
        clock: SystemClock,
    };

    let mode = if args.execute {
        GovernanceMode::Execute {
            execute_advisory: args.execute_advisory,
        }
    } else {
        GovernanceMode::PlanOnly
    };

    let result = run_governance_loop(&mut assessor, &mut executor, mode, target_risk, args.max_rounds);

    let stop_reason = match result.stop_reason {
        StopReason::TargetRiskReached => "target-risk-reached",
        StopReason::ReleaseGateBlockedNoActionablePlan => "release-gate-blocked-no-actionable-plan",
        StopReason::NonMutatingModeExhausted => "non-mutating-mode-exhausted",
        StopReason::RoundCapReached => "round-cap-reached",
        StopReason::MaintenanceOrAdvisoryFailed => "maintenance-or-advisory-failed",
    };

    match format {
        OutputFormat::Json => emit(
            format,
            &serde_json::json!({
                "rounds": result.rounds.len(),
                "stop_reason": stop_reason,
                "final_risk": result.rounds.last().map(|r| risk_label(r.assessment.risk_level)),
            }),
        )?,
        OutputFormat::Text => {
            println!("{} round(s), stopped: {stop_reason}", result.rounds.len());
        }
    }

    if matches!(
        result.stop_reason,
        StopReason::ReleaseGateBlockedNoActionablePlan | StopReason::MaintenanceOrAdvisoryFailed
    ) {
        return Err(CliError::PolicyViolation(format!(
            "governance loop stopped: {stop_reason}"
        )));
    }
    Ok(())
}

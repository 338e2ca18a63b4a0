// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `auto handoff {plan|queue|template-diff|capability-matrix|run|regression|evidence|gate-index}`:
//! the Release Gate Evaluator's command surface (§4.11), grounded on
//! [`ac_control::release_gate`], [`ac_specs::handoff`], and
//! [`ac_storage::EvidenceLog`].

use std::path::PathBuf;

use ac_control::release_gate::{
    evaluate, CapabilityCoverageSignals, GateThresholds, MatrixRegressionSignals,
    ReleaseGateDecision, ReleaseGateInputs,
};
use ac_specs::{infer_capabilities_from_lexicon, HandoffManifest, REQUIRED_DOCS};
use ac_storage::{default_evidence_root, EvidenceLog};
use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{emit, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum HandoffCommand {
    /// Evaluate the release gate against current signals, without recording evidence.
    Plan(SignalsArgs),
    /// List the manifest's declared gaps as a remediation queue.
    Queue(ManifestArgs),
    /// Diff a manifest's declared templates against the required doc set.
    TemplateDiff(ManifestArgs),
    /// Compare manifest-declared capabilities against lexicon-inferred ones.
    CapabilityMatrix(CapabilityMatrixArgs),
    /// Evaluate the release gate and append the decision to release evidence.
    Run(SignalsArgs),
    /// Evaluate the matrix-regression signal in isolation.
    Regression(RegressionArgs),
    /// List recorded release-gate run outcomes.
    Evidence(EvidenceArgs),
    /// Print the current gate threshold configuration.
    GateIndex(ManifestArgs),
}

#[derive(Debug, Args)]
pub struct ManifestArgs {
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct CapabilityMatrixArgs {
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Spec/goal text files to mine for `capability:` lexicon tags.
    #[arg(long = "text")]
    pub texts: Vec<PathBuf>,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct SignalsArgs {
    /// JSON file deserializing to `ReleaseGateInputs`; defaults absent signals are zero.
    #[arg(long)]
    pub signals: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct RegressionArgs {
    #[arg(long, default_value_t = 0)]
    pub count: u32,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct EvidenceArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

pub fn run(command: HandoffCommand, format: OutputFormat) -> Result<(), CliError> {
    match command {
        HandoffCommand::Plan(args) => plan(args, format),
        HandoffCommand::Queue(args) => queue(args, format),
        HandoffCommand::TemplateDiff(args) => template_diff(args, format),
        HandoffCommand::CapabilityMatrix(args) => capability_matrix(args, format),
        HandoffCommand::Run(args) => run_gate(args, format),
        HandoffCommand::Regression(args) => regression(args, format),
        HandoffCommand::Evidence(args) => evidence(args, format),
        HandoffCommand::GateIndex(args) => gate_index(args, format),
    }
}

fn load_manifest(path: Option<&PathBuf>) -> Result<HandoffManifest, CliError> {
    match path {
        Some(path) => Ok(HandoffManifest::load(path)?.unwrap_or_default()),
        None => Ok(HandoffManifest::default()),
    }
}

fn load_signals(path: Option<&PathBuf>) -> Result<ReleaseGateInputs, CliError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw).map_err(CliError::from)
        }
        None => Ok(ReleaseGateInputs::default()),
    }
}

fn print_decision(decision: &ReleaseGateDecision, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => emit(format, decision)?,
        OutputFormat::Text => {
            println!("release gate: {}", if decision.passed { "pass" } else { "blocked" });
            for reason in &decision.blocked_reasons {
                println!("  blocked: {reason}");
            }
            for rec in &decision.recommendations {
                println!("  recommend: {rec}");
            }
        }
    }
    Ok(())
}

fn plan(args: SignalsArgs, format: OutputFormat) -> Result<(), CliError> {
    let inputs = load_signals(args.signals.as_ref())?;
    let decision = evaluate(&inputs, &GateThresholds::default());
    print_decision(&decision, format)
}

fn run_gate(args: SignalsArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let inputs = load_signals(args.signals.as_ref())?;
    let decision = evaluate(&inputs, &GateThresholds::default());

    let log = EvidenceLog::new(default_evidence_root(&project_root));
    let id = format!("{}", Utc::now().format("%Y%m%d%H%M%S%.3f"));
    log.append(id, Utc::now(), serde_json::to_value(&decision)?)?;

    print_decision(&decision, format)?;
    if !decision.passed {
        return Err(CliError::PolicyViolation("release gate blocked".to_string()));
    }
    Ok(())
}

fn regression(args: RegressionArgs, format: OutputFormat) -> Result<(), CliError> {
    let inputs = ReleaseGateInputs {
        matrix: MatrixRegressionSignals { regressions: args.count },
        ..Default::default()
    };
    let decision = evaluate(&inputs, &GateThresholds::default());
    print_decision(&decision, format)
}

#[derive(Debug, Serialize)]
struct QueueReport {
    source_project: String,
    gaps: Vec<String>,
}

fn queue(args: ManifestArgs, format: OutputFormat) -> Result<(), CliError> {
    let manifest = load_manifest(args.manifest.as_ref())?;
    let report = QueueReport {
        source_project: manifest.source_project,
        gaps: manifest.gaps,
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            if report.gaps.is_empty() {
                println!("no outstanding handoff gaps");
            }
            for (i, gap) in report.gaps.iter().enumerate() {
                println!("{}. {gap}", i + 1);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct TemplateDiffReport {
    required: Vec<String>,
    declared: Vec<String>,
    missing: Vec<String>,
    extra: Vec<String>,
}

fn template_diff(args: ManifestArgs, format: OutputFormat) -> Result<(), CliError> {
    let manifest = load_manifest(args.manifest.as_ref())?;
    let required: Vec<String> = REQUIRED_DOCS.iter().map(|s| s.to_string()).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|d| !manifest.templates.contains(d))
        .cloned()
        .collect();
    let extra: Vec<String> = manifest
        .templates
        .iter()
        .filter(|d| !required.contains(d))
        .cloned()
        .collect();

    let report = TemplateDiffReport {
        required,
        declared: manifest.templates,
        missing,
        extra,
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            if report.missing.is_empty() && report.extra.is_empty() {
                println!("templates match the required set");
            }
            for d in &report.missing {
                println!("missing: {d}");
            }
            for d in &report.extra {
                println!("extra: {d}");
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CapabilityMatrixReport {
    declared: Vec<String>,
    inferred: Vec<String>,
    unknown: Vec<String>,
    signals: CapabilityCoverageSignals,
}

fn capability_matrix(args: CapabilityMatrixArgs, format: OutputFormat) -> Result<(), CliError> {
    let manifest = load_manifest(args.manifest.as_ref())?;
    let mut texts = Vec::new();
    for path in &args.texts {
        texts.push(std::fs::read_to_string(path)?);
    }
    let inferred = infer_capabilities_from_lexicon(&texts);
    let declared = manifest.expected_capabilities().to_vec();
    let unknown: Vec<String> = inferred
        .iter()
        .filter(|c| !declared.contains(c))
        .cloned()
        .collect();

    let expected = declared.len().max(inferred.len()) as u32;
    let signals = CapabilityCoverageSignals {
        expected,
        declared: declared.len() as u32,
        unknown: unknown.len() as u32,
    };

    let report = CapabilityMatrixReport {
        declared,
        inferred,
        unknown,
        signals,
    };

    match format {
        OutputFormat::Json => emit(format, &report)?,
        OutputFormat::Text => {
            println!("declared: {:?}", report.declared);
            println!("inferred: {:?}", report.inferred);
            if !report.unknown.is_empty() {
                println!("unknown (inferred but not declared): {:?}", report.unknown);
            }
        }
    }
    Ok(())
}

fn gate_index(args: ManifestArgs, format: OutputFormat) -> Result<(), CliError> {
    let _ = args;
    let thresholds = GateThresholds::default();

    match format {
        OutputFormat::Json => emit(
            format,
            &serde_json::json!({
                "max_config_warnings": thresholds.max_config_warnings,
                "max_auth_tier_block_rate": thresholds.max_auth_tier_block_rate,
                "max_dialogue_block_rate": thresholds.max_dialogue_block_rate,
                "max_ui_mode_violation_rate": thresholds.max_ui_mode_violation_rate,
                "max_matrix_regressions": thresholds.max_matrix_regressions,
                "max_unknown_capabilities": thresholds.max_unknown_capabilities,
                "max_unknown_capability_rate": thresholds.max_unknown_capability_rate,
            }),
        )?,
        OutputFormat::Text => {
            println!("max-config-warnings: {}", thresholds.max_config_warnings);
            println!("max-auth-tier-block-rate: {:.0}%", thresholds.max_auth_tier_block_rate);
            println!("max-dialogue-block-rate: {:.0}%", thresholds.max_dialogue_block_rate);
            println!("max-ui-mode-violation-rate: {:.0}%", thresholds.max_ui_mode_violation_rate);
            println!("max-matrix-regressions: {}", thresholds.max_matrix_regressions);
            println!("max-unknown-capabilities: {}", thresholds.max_unknown_capabilities);
            println!("max-unknown-capability-rate: {:.0}%", thresholds.max_unknown_capability_rate);
        }
    }
    Ok(())
}

fn evidence(args: EvidenceArgs, format: OutputFormat) -> Result<(), CliError> {
    let project_root = args.project_root.canonicalize().unwrap_or(args.project_root);
    let log = EvidenceLog::new(default_evidence_root(&project_root));
    let mut entries = log.list()?;
    entries.reverse();
    entries.truncate(args.limit);

    match format {
        OutputFormat::Json => emit(format, &entries)?,
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("no release-evidence entries");
            }
            for e in &entries {
                println!("{} {}", e.id, e.recorded_at);
            }
        }
    }
    Ok(())
}

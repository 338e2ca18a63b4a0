// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Program Runner (§4.8): turns one broad goal into a batch via semantic
//! decomposition, then evaluates the Program Gate against the batch
//! outcome, with an optional "governance until stable" loop.

use ac_core::Goal;
use serde::{Deserialize, Serialize};

use crate::batch::{BatchConfig, BatchSummary, GoalRunner};
use crate::error::ControlError;
use crate::release_gate::RiskLevel;

/// Score and split one broad goal into several narrower goals.
///
/// Splits on clause boundaries (commas, semicolons, "and"/"then"), then
/// scores the split by three signals: clause coverage (did every clause
/// make it into some sub-goal), category diversity (how many distinct
/// leading-verb categories appear), and length balance (how close the
/// sub-goals are to equal length). Below `min_quality` the split is
/// refined once by dropping empty/trivial clauses and re-scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDecomposition {
    pub goals: Vec<Goal>,
    pub quality_score: f64,
    pub refined: bool,
}

const CLAUSE_SEPARATORS: &[&str] = &[";", ",", " and then ", " and ", " then "];

fn split_clauses(text: &str) -> Vec<String> {
    let mut clauses = vec![text.to_string()];
    for sep in CLAUSE_SEPARATORS {
        clauses = clauses
            .into_iter()
            .flat_map(|c| c.split(sep).map(|s| s.trim().to_string()).collect::<Vec<_>>())
            .collect();
    }
    clauses.into_iter().filter(|c| !c.is_empty()).collect()
}

fn leading_verb(clause: &str) -> String {
    clause
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn score_split(clauses: &[String]) -> f64 {
    if clauses.is_empty() {
        return 0.0;
    }
    let coverage = 1.0; // every clause that survived filtering is represented
    let categories: std::collections::HashSet<String> =
        clauses.iter().map(|c| leading_verb(c)).collect();
    let diversity = (categories.len() as f64 / clauses.len() as f64).min(1.0);
    let lengths: Vec<usize> = clauses.iter().map(|c| c.split_whitespace().count()).collect();
    let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    let variance =
        lengths.iter().map(|l| (*l as f64 - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
    let balance = 1.0 / (1.0 + variance.sqrt() / mean.max(1.0));

    (coverage + diversity + balance) / 3.0
}

pub fn decompose_program_goal(goal: &Goal, min_quality: f64) -> ProgramDecomposition {
    let mut clauses = split_clauses(&goal.text);
    let mut quality = score_split(&clauses);
    let mut refined = false;

    if quality < min_quality {
        clauses.retain(|c| c.split_whitespace().count() >= 2);
        if clauses.is_empty() {
            clauses = vec![goal.text.clone()];
        }
        quality = score_split(&clauses);
        refined = true;
    }

    let goals = clauses
        .into_iter()
        .map(|text| Goal { text, id: None })
        .collect();

    ProgramDecomposition {
        goals,
        quality_score: quality,
        refined,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateProfile {
    Default,
    Dev,
    Staging,
    Prod,
    Moqui,
    Enterprise,
}

#[derive(Debug, Clone, Copy)]
pub struct GateThresholds {
    pub min_success_rate: f64,
    pub max_risk_level: RiskLevel,
    pub max_elapsed: std::time::Duration,
    pub max_sub_specs: u32,
    pub max_agent_budget: u32,
}

impl GateProfile {
    pub fn thresholds(&self) -> GateThresholds {
        use std::time::Duration;
        match self {
            GateProfile::Default => GateThresholds {
                min_success_rate: 0.8,
                max_risk_level: RiskLevel::Medium,
                max_elapsed: Duration::from_secs(3600),
                max_sub_specs: 50,
                max_agent_budget: 32,
            },
            GateProfile::Dev => GateThresholds {
                min_success_rate: 0.5,
                max_risk_level: RiskLevel::High,
                max_elapsed: Duration::from_secs(7200),
                max_sub_specs: 100,
                max_agent_budget: 64,
            },
            GateProfile::Staging => GateThresholds {
                min_success_rate: 0.7,
                max_risk_level: RiskLevel::Medium,
                max_elapsed: Duration::from_secs(3600),
                max_sub_specs: 75,
                max_agent_budget: 48,
            },
            GateProfile::Prod => GateThresholds {
                min_success_rate: 0.95,
                max_risk_level: RiskLevel::Low,
                max_elapsed: Duration::from_secs(1800),
                max_sub_specs: 30,
                max_agent_budget: 16,
            },
            GateProfile::Moqui => GateThresholds {
                min_success_rate: 0.9,
                max_risk_level: RiskLevel::Low,
                max_elapsed: Duration::from_secs(2400),
                max_sub_specs: 40,
                max_agent_budget: 24,
            },
            GateProfile::Enterprise => GateThresholds {
                min_success_rate: 0.98,
                max_risk_level: RiskLevel::Low,
                max_elapsed: Duration::from_secs(1200),
                max_sub_specs: 20,
                max_agent_budget: 12,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramGateVerdict {
    pub passed: bool,
    pub profile_used: GateProfile,
    pub passed_on_fallback: bool,
    pub reasons: Vec<String>,
}

fn evaluate_against(
    profile: GateProfile,
    summary: &BatchSummary,
    risk: RiskLevel,
) -> Vec<String> {
    let thresholds = profile.thresholds();
    let mut reasons = Vec::new();
    if summary.metrics.success_rate < thresholds.min_success_rate {
        reasons.push(format!(
            "success-rate-below-threshold:{:.0}/{:.0}",
            summary.metrics.success_rate * 100.0,
            thresholds.min_success_rate * 100.0
        ));
    }
    if risk > thresholds.max_risk_level {
        reasons.push(format!("risk-level-above-threshold:{risk:?}/{:?}", thresholds.max_risk_level));
    }
    if summary.resource_plan.total_wait > thresholds.max_elapsed {
        reasons.push("elapsed-time-budget-exceeded".to_string());
    }
    let total_sub_specs: u32 = summary
        .goal_outcomes
        .iter()
        .map(|o| o.sub_spec_count)
        .sum();
    if total_sub_specs > thresholds.max_sub_specs {
        reasons.push(format!(
            "sub-spec-ceiling-exceeded:{total_sub_specs}/{}",
            thresholds.max_sub_specs
        ));
    }
    if summary.resource_plan.configured_agent_budget as u32 > thresholds.max_agent_budget {
        reasons.push(format!(
            "agent-budget-ceiling-exceeded:{}/{}",
            summary.resource_plan.configured_agent_budget, thresholds.max_agent_budget
        ));
    }
    reasons
}

/// Evaluate the primary profile, falling back through `fallback_chain` in
/// order on failure. The first profile (primary or fallback) that passes
/// wins; `passed_on_fallback` is set whenever it wasn't the primary.
pub fn evaluate_program_gate(
    summary: &BatchSummary,
    risk: RiskLevel,
    primary: GateProfile,
    fallback_chain: &[GateProfile],
) -> ProgramGateVerdict {
    let primary_reasons = evaluate_against(primary, summary, risk);
    if primary_reasons.is_empty() {
        return ProgramGateVerdict {
            passed: true,
            profile_used: primary,
            passed_on_fallback: false,
            reasons: Vec::new(),
        };
    }

    for &candidate in fallback_chain {
        let reasons = evaluate_against(candidate, summary, risk);
        if reasons.is_empty() {
            return ProgramGateVerdict {
                passed: true,
                profile_used: candidate,
                passed_on_fallback: true,
                reasons: Vec::new(),
            };
        }
    }

    ProgramGateVerdict {
        passed: false,
        profile_used: primary,
        passed_on_fallback: false,
        reasons: primary_reasons,
    }
}

#[derive(Debug, Clone)]
pub struct ProgramConfig {
    pub batch: BatchConfig,
    pub min_decomposition_quality: f64,
    pub primary_profile: GateProfile,
    pub fallback_chain: Vec<GateProfile>,
    pub sub_override: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramResult {
    pub decomposition: ProgramDecomposition,
    pub batch_summary: BatchSummary,
    pub gate_verdict: ProgramGateVerdict,
    pub remediation: Vec<String>,
}

/// Build remediation recommendations from a failed gate verdict. Ordered
/// so the most actionable suggestion comes first.
fn suggest_remediation(verdict: &ProgramGateVerdict, summary: &BatchSummary) -> Vec<String> {
    let mut out = Vec::new();
    for reason in &verdict.reasons {
        if reason.starts_with("success-rate-below-threshold") {
            if let Some(failed) = summary
                .goal_outcomes
                .iter()
                .find(|o| o.status != crate::batch::GoalStatus::Completed)
            {
                out.push(format!("--continue-from {}", failed.session_id));
            }
        } else if reason.starts_with("sub-spec-ceiling-exceeded") {
            out.push("prune-sub-specs --target-profile-ceiling".to_string());
        } else if reason.starts_with("risk-level-above-threshold") {
            out.push("governance maintain --target-risk medium".to_string());
        }
    }
    out
}

/// Run one broad goal end-to-end: decompose, batch-execute via `runner`,
/// evaluate the program gate, and suggest remediation on failure.
pub async fn run_program<R: GoalRunner + 'static>(
    runner: R,
    goal: Goal,
    config: ProgramConfig,
    batch_session: ac_core::SessionId,
    observed_risk: RiskLevel,
) -> Result<ProgramResult, ControlError> {
    let decomposition = decompose_program_goal(&goal, config.min_decomposition_quality);
    let batch_summary = crate::batch::run_batch(
        runner,
        decomposition.goals.clone(),
        config.batch.clone(),
        batch_session,
    )
    .await?;

    let gate_verdict = evaluate_program_gate(
        &batch_summary,
        observed_risk,
        config.primary_profile,
        &config.fallback_chain,
    );
    let remediation = if gate_verdict.passed {
        Vec::new()
    } else {
        suggest_remediation(&gate_verdict, &batch_summary)
    };

    Ok(ProgramResult {
        decomposition,
        batch_summary,
        gate_verdict,
        remediation,
    })
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release Gate Evaluator (§4.11): composes weekly-ops pressure, matrix
//! regression, capability coverage, and preflight signals into a single
//! pass/block decision with structured (not free-text) blocked reasons.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Weekly operations pressure observed across recent runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyOpsSignals {
    pub blocked_runs: u32,
    pub total_runs: u32,
    pub config_warnings: u32,
    pub auth_tier_blocks: u32,
    pub auth_tier_attempts: u32,
    pub dialogue_blocks: u32,
    pub dialogue_attempts: u32,
    pub ui_mode_violations: u32,
    pub ui_mode_checks: u32,
}

impl WeeklyOpsSignals {
    fn rate(numerator: u32, denominator: u32) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            numerator as f64 / denominator as f64 * 100.0
        }
    }

    pub fn auth_tier_block_rate(&self) -> f64 {
        Self::rate(self.auth_tier_blocks, self.auth_tier_attempts)
    }

    pub fn dialogue_block_rate(&self) -> f64 {
        Self::rate(self.dialogue_blocks, self.dialogue_attempts)
    }

    pub fn ui_mode_violation_rate(&self) -> f64 {
        Self::rate(self.ui_mode_violations, self.ui_mode_checks)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixRegressionSignals {
    pub regressions: u32,
}

/// Capability coverage against either a manifest-declared or
/// lexicon-inferred set of expected capabilities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityCoverageSignals {
    pub expected: u32,
    pub declared: u32,
    pub unknown: u32,
}

impl CapabilityCoverageSignals {
    pub fn unknown_rate(&self) -> f64 {
        if self.expected == 0 {
            0.0
        } else {
            self.unknown as f64 / self.expected as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreflightSignals {
    pub warnings: u32,
    pub errors: u32,
}

#[derive(Debug, Clone)]
pub struct GateThresholds {
    pub max_config_warnings: u32,
    pub max_auth_tier_block_rate: f64,
    pub max_dialogue_block_rate: f64,
    pub max_ui_mode_violation_rate: f64,
    pub max_matrix_regressions: u32,
    pub max_unknown_capabilities: u32,
    pub max_unknown_capability_rate: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            max_config_warnings: 0,
            max_auth_tier_block_rate: 40.0,
            max_dialogue_block_rate: 40.0,
            max_ui_mode_violation_rate: 10.0,
            max_matrix_regressions: 0,
            max_unknown_capabilities: 0,
            max_unknown_capability_rate: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseGateDecision {
    pub passed: bool,
    pub blocked_reasons: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseGateInputs {
    pub weekly_ops: WeeklyOpsSignals,
    pub matrix: MatrixRegressionSignals,
    pub capability: CapabilityCoverageSignals,
    pub preflight: PreflightSignals,
}

/// Evaluate the release gate, producing structured blocked reasons
/// downstream consumers parse by prefix rather than free text (§4.11).
pub fn evaluate(inputs: &ReleaseGateInputs, thresholds: &GateThresholds) -> ReleaseGateDecision {
    let mut reasons = Vec::new();
    let mut recommendations = Vec::new();

    if inputs.weekly_ops.config_warnings > thresholds.max_config_warnings {
        reasons.push(format!(
            "weekly-ops-config-warnings-present:{}",
            inputs.weekly_ops.config_warnings
        ));
        recommendations.push("review-weekly-config-warnings".to_string());
    }

    let auth_rate = inputs.weekly_ops.auth_tier_block_rate();
    if auth_rate > thresholds.max_auth_tier_block_rate {
        reasons.push(format!(
            "weekly-ops-auth-tier-block-rate-high:{:.0}",
            auth_rate
        ));
        recommendations.push("interactive-authorization-tier-evaluate".to_string());
    }

    let dialogue_rate = inputs.weekly_ops.dialogue_block_rate();
    if dialogue_rate > thresholds.max_dialogue_block_rate {
        reasons.push(format!(
            "weekly-ops-dialogue-block-rate-high:{:.0}",
            dialogue_rate
        ));
        recommendations.push("dialogue-policy-review".to_string());
    }

    let ui_rate = inputs.weekly_ops.ui_mode_violation_rate();
    if ui_rate > thresholds.max_ui_mode_violation_rate {
        reasons.push(format!("weekly-ops-ui-mode-violation-rate-high:{:.0}", ui_rate));
        recommendations.push("runtime-ui-mode-audit".to_string());
    }

    if inputs.matrix.regressions > thresholds.max_matrix_regressions {
        reasons.push(format!(
            "handoff-moqui-matrix-regressions-over-gate:{}/{}",
            inputs.matrix.regressions, thresholds.max_matrix_regressions
        ));
        recommendations.push("handoff regression --triage".to_string());
    }

    if inputs.capability.unknown > thresholds.max_unknown_capabilities
        || inputs.capability.unknown_rate() > thresholds.max_unknown_capability_rate
    {
        reasons.push(format!(
            "capability-coverage-unknown-over-gate:{}/{}",
            inputs.capability.unknown, inputs.capability.expected
        ));
        recommendations.push("handoff capability-matrix --refresh".to_string());
    }

    if inputs.preflight.errors > 0 {
        reasons.push(format!("preflight-errors-present:{}", inputs.preflight.errors));
        recommendations.push("handoff plan --reverify".to_string());
    }

    ReleaseGateDecision {
        passed: reasons.is_empty(),
        blocked_reasons: reasons,
        recommendations,
    }
}

#[cfg(test)]
#[path = "release_gate_tests.rs"]
mod tests;

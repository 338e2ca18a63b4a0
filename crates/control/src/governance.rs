// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Governance Close-Loop (§4.10): cross-archive health assessment, plan
//! generation, and a bounded maintain-then-advise loop.

use serde::{Deserialize, Serialize};

use crate::release_gate::RiskLevel;

/// Handoff-specific quality signals folded into the health assessment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandoffSignals {
    pub capability_unknowns: u32,
    pub matrix_regressions: u32,
    pub weekly_ops_pressure: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub risk_level: RiskLevel,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
    pub release_gate_ready: bool,
    pub handoff_signals: HandoffSignals,
}

/// Computes a [`HealthAssessment`] from whatever archives the caller has
/// access to. Kept as a port, the same way `ac_engine::CloseLoopRunner`
/// takes its decompose/bootstrap/gate logic as injected collaborators,
/// since "scan every archive kind" is cross-crate plumbing that belongs
/// to the eventual CLI wiring, not to the governance loop's control flow.
pub trait HealthAssessor: Send + Sync {
    fn assess(&mut self) -> HealthAssessment;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceAction {
    SessionPrune,
    BatchSessionPrune,
    ControllerSessionPrune,
    RecoveryMemoryPrune,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvisoryAction {
    RecoverLatest,
    ControllerResumeLatest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernancePlan {
    pub maintenance: Vec<MaintenanceAction>,
    pub advisory: Vec<AdvisoryAction>,
}

/// Build the plan implied by a health assessment: every concern in
/// `handoff_signals`/`concerns` maps to a maintenance or advisory action.
pub fn plan_from_assessment(assessment: &HealthAssessment) -> GovernancePlan {
    let mut maintenance = Vec::new();
    let mut advisory = Vec::new();

    if assessment
        .concerns
        .iter()
        .any(|c| c.contains("session") && !c.contains("batch") && !c.contains("controller"))
    {
        maintenance.push(MaintenanceAction::SessionPrune);
    }
    if assessment.concerns.iter().any(|c| c.contains("batch-session")) {
        maintenance.push(MaintenanceAction::BatchSessionPrune);
    }
    if assessment.concerns.iter().any(|c| c.contains("controller-session")) {
        maintenance.push(MaintenanceAction::ControllerSessionPrune);
    }
    if assessment.concerns.iter().any(|c| c.contains("recovery-memory")) {
        maintenance.push(MaintenanceAction::RecoveryMemoryPrune);
    }

    if assessment.concerns.iter().any(|c| c.contains("recoverable-failure")) {
        advisory.push(AdvisoryAction::RecoverLatest);
    }
    if assessment.concerns.iter().any(|c| c.contains("controller-stalled")) {
        advisory.push(AdvisoryAction::ControllerResumeLatest);
    }

    GovernancePlan {
        maintenance,
        advisory,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Applied,
    Skipped,
    Failed,
}

/// Applies maintenance/advisory actions. A no-op in plan-only mode; the
/// real filesystem effects (session prune, recovery-memory prune,
/// controller resume) live behind this port for the same reason
/// [`HealthAssessor`] does.
pub trait PlanExecutor: Send + Sync {
    fn apply_maintenance(&mut self, action: MaintenanceAction) -> ActionResult;

    /// Execute an advisory action against the latest actionable source.
    /// Returns `Skipped` (never `Failed`) when nothing is actionable.
    fn execute_advisory(&mut self, action: AdvisoryAction) -> ActionResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernanceMode {
    PlanOnly,
    Execute { execute_advisory: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    TargetRiskReached,
    ReleaseGateBlockedNoActionablePlan,
    NonMutatingModeExhausted,
    RoundCapReached,
    MaintenanceOrAdvisoryFailed,
}

#[derive(Debug, Clone)]
pub struct GovernanceRound {
    pub assessment: HealthAssessment,
    pub plan: GovernancePlan,
    pub applied: Vec<(String, ActionResult)>,
}

#[derive(Debug, Clone)]
pub struct GovernanceResult {
    pub rounds: Vec<GovernanceRound>,
    pub stop_reason: StopReason,
}

/// Run the governance loop: `maintain -> gate -> (next round)?` until
/// `target_risk` is reached, the release gate is blocked with nothing
/// actionable, the mode is non-mutating, a round fails, or `max_rounds`
/// is hit.
pub fn run_governance_loop<H: HealthAssessor, P: PlanExecutor>(
    assessor: &mut H,
    executor: &mut P,
    mode: GovernanceMode,
    target_risk: RiskLevel,
    max_rounds: u32,
) -> GovernanceResult {
    let mut rounds = Vec::new();

    for round_index in 0..max_rounds {
        let assessment = assessor.assess();
        let plan = plan_from_assessment(&assessment);

        if assessment.risk_level <= target_risk {
            rounds.push(GovernanceRound {
                assessment,
                plan,
                applied: Vec::new(),
            });
            return GovernanceResult {
                rounds,
                stop_reason: StopReason::TargetRiskReached,
            };
        }

        let nothing_actionable = plan.maintenance.is_empty() && plan.advisory.is_empty();
        if !assessment.release_gate_ready && nothing_actionable {
            rounds.push(GovernanceRound {
                assessment,
                plan,
                applied: Vec::new(),
            });
            return GovernanceResult {
                rounds,
                stop_reason: StopReason::ReleaseGateBlockedNoActionablePlan,
            };
        }

        if mode == GovernanceMode::PlanOnly {
            rounds.push(GovernanceRound {
                assessment,
                plan,
                applied: Vec::new(),
            });
            return GovernanceResult {
                rounds,
                stop_reason: StopReason::NonMutatingModeExhausted,
            };
        }

        let execute_advisory = matches!(mode, GovernanceMode::Execute { execute_advisory: true });
        let mut applied = Vec::new();
        let mut any_failed = false;

        for action in &plan.maintenance {
            let result = executor.apply_maintenance(*action);
            if result == ActionResult::Failed {
                any_failed = true;
            }
            applied.push((format!("{action:?}"), result));
        }
        if execute_advisory {
            for action in &plan.advisory {
                let result = executor.execute_advisory(*action);
                if result == ActionResult::Failed {
                    any_failed = true;
                }
                applied.push((format!("{action:?}"), result));
            }
        }

        rounds.push(GovernanceRound {
            assessment,
            plan,
            applied,
        });

        if any_failed {
            return GovernanceResult {
                rounds,
                stop_reason: StopReason::MaintenanceOrAdvisoryFailed,
            };
        }

        if round_index + 1 == max_rounds {
            return GovernanceResult {
                rounds,
                stop_reason: StopReason::RoundCapReached,
            };
        }
    }

    GovernanceResult {
        rounds,
        stop_reason: StopReason::RoundCapReached,
    }
}

#[cfg(test)]
#[path = "governance_tests.rs"]
mod tests;

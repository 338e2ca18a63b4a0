// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Control plane: batch scheduling, program decomposition, the queue-
//! draining controller, governance close-loop, release gate evaluation,
//! and shared session-id generation (§4.7-§4.11).

mod error;
mod ids;

pub mod batch;
pub mod controller;
pub mod governance;
pub mod program;
pub mod release_gate;

pub use error::ControlError;
pub use ids::next_session_id;

pub use batch::{
    BatchConfig, BatchMetrics, BatchRetryRound, BatchSummary, GoalRunOutcome, GoalRunner,
    GoalStatus, ResourcePlan, RetryMode, ScheduleStrategy,
};
pub use controller::{
    parse_queue, ControllerConfig, ControllerGoalOutcome, ControllerResult, ProgramRunnerPort,
};
pub use governance::{
    plan_from_assessment, run_governance_loop, ActionResult, AdvisoryAction, GovernanceMode,
    GovernancePlan, GovernanceResult, GovernanceRound, HandoffSignals, HealthAssessment,
    HealthAssessor, MaintenanceAction, PlanExecutor,
};
pub use program::{
    decompose_program_goal, evaluate_program_gate, run_program, GateProfile, GateThresholds,
    ProgramConfig, ProgramDecomposition, ProgramGateVerdict, ProgramResult,
};
pub use release_gate::{
    CapabilityCoverageSignals, GateThresholds as ReleaseGateThresholds, MatrixRegressionSignals,
    PreflightSignals, ReleaseGateDecision, ReleaseGateInputs, RiskLevel, WeeklyOpsSignals,
};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Close-Loop Runner (§4.6): the single-goal state machine
//! `START -> DECOMPOSE -> BOOTSTRAP_SPECS -> ORCHESTRATE -> GATE -> (REPLAN
//! | END)`.
//!
//! DECOMPOSE/BOOTSTRAP_SPECS/GATE are concerns of the not-yet-built spec
//! bootstrap and gate-evaluation layers; this module takes them as
//! injected ports rather than implementing spec parsing itself, the same
//! way [`crate::orchestrator::AgentOrchestrator`] takes its adapter and
//! clock as generic collaborators instead of owning subprocess details.

use serde_json::{json, Value};

use ac_core::{Clock, Event, Goal, SessionId, SessionKind, SessionStatus, SpecId};
use ac_storage::SessionArchive;

use crate::error::EngineError;
use crate::orchestrator::{AgentOrchestrator, OrchestrationSummary, SpecTask};

/// Output of DECOMPOSE (§4.6): a master spec and its `subCount ∈ [2,5]`
/// sub-specs.
#[derive(Debug, Clone)]
pub struct DecomposePlan {
    pub master_spec: SpecId,
    pub sub_specs: Vec<SpecId>,
}

/// Splits a goal into a master spec and sub-specs.
pub trait GoalDecomposer: Send + Sync {
    /// `sub_override` is `--subs`, when the operator pins the count
    /// instead of leaving it to the complexity score.
    fn decompose(&self, goal: &Goal, sub_override: Option<u8>) -> Result<DecomposePlan, EngineError>;
}

/// Creates skeleton spec directories and collaboration metadata for a
/// decomposed plan, returning orchestrator-ready tasks.
pub trait SpecBootstrapper: Send + Sync {
    fn bootstrap(&self, plan: &DecomposePlan) -> Result<Vec<SpecTask>, EngineError>;

    /// Called on REPLAN_CYCLE instead of the original bootstrap, with the
    /// prior cycle's summary available to adjust the plan (e.g. narrow
    /// the prompt, split a spec that kept failing).
    fn replan(
        &self,
        plan: &DecomposePlan,
        prior: &OrchestrationSummary,
    ) -> Result<Vec<SpecTask>, EngineError>;
}

/// Verdict of evaluating the Definition-of-Done gates against one
/// orchestration cycle's summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    Pass,
    PartialFailed(Vec<String>),
    Failed(Vec<String>),
}

/// Evaluates DoD gates (tests, risk, completion-rate, docs, collaboration,
/// ...) against one orchestration cycle.
pub trait GateEvaluator: Send + Sync {
    fn evaluate(&self, summary: &OrchestrationSummary) -> GateVerdict;
}

/// Replan budget strategy (§4.6).
#[derive(Debug, Clone, Copy)]
pub enum ReplanStrategy {
    /// Up to `replan_attempts` retries regardless of progress.
    Fixed { replan_attempts: u32 },
    /// Stop when no progress repeats for `no_progress_window` consecutive
    /// failed cycles, or when `replan_attempts` is exhausted.
    Adaptive {
        replan_attempts: u32,
        no_progress_window: u32,
    },
}

impl Default for ReplanStrategy {
    fn default() -> Self {
        ReplanStrategy::Adaptive {
            replan_attempts: 3,
            no_progress_window: 2,
        }
    }
}

/// Final outcome of one close-loop run.
#[derive(Debug, Clone)]
pub struct CloseLoopResult {
    pub status: SessionStatus,
    pub cycles: u32,
    pub last_summary: Option<OrchestrationSummary>,
}

/// Whether [`CloseLoopRunner::run`] starts a new session or continues an
/// existing one under the same session id (§4.6 persistence/resume).
#[derive(Debug, Clone, Default)]
pub enum ResumeMode {
    #[default]
    Fresh,
    /// Resume `session_id` instead of creating it. `policy` (the invoked
    /// goal/gate/replan flags, serialized by the caller) is compared
    /// against the saved session's recorded policy; a mismatch is
    /// refused unless `allow_drift`.
    Resume { allow_drift: bool },
}

/// Drives one goal through DECOMPOSE -> BOOTSTRAP_SPECS -> ORCHESTRATE ->
/// GATE -> (REPLAN | END), persisting a session snapshot after every
/// transition.
pub struct CloseLoopRunner<C, D, B, G>
where
    C: Clock,
    D: GoalDecomposer,
    B: SpecBootstrapper,
    G: GateEvaluator,
{
    clock: C,
    archive: SessionArchive,
    decomposer: D,
    bootstrapper: B,
    gate_evaluator: G,
    replan_strategy: ReplanStrategy,
}

impl<C, D, B, G> CloseLoopRunner<C, D, B, G>
where
    C: Clock,
    D: GoalDecomposer,
    B: SpecBootstrapper,
    G: GateEvaluator,
{
    pub fn new(
        clock: C,
        archive: SessionArchive,
        decomposer: D,
        bootstrapper: B,
        gate_evaluator: G,
        replan_strategy: ReplanStrategy,
    ) -> Self {
        Self {
            clock,
            archive,
            decomposer,
            bootstrapper,
            gate_evaluator,
            replan_strategy,
        }
    }

    /// Drive `goal` to completion under `session_id`, using `orchestrator`
    /// to run each ORCHESTRATE phase.
    ///
    /// `policy` is an opaque, caller-built snapshot of the flags that
    /// govern this run (gate thresholds, replan strategy, sub-spec
    /// override, ...), recorded on the session envelope so a later
    /// `--resume` can detect drift against it.
    pub async fn run<J>(
        &mut self,
        goal: Goal,
        session_id: SessionId,
        sub_override: Option<u8>,
        orchestrator: &mut AgentOrchestrator<C, J>,
        resume: ResumeMode,
        policy: Value,
    ) -> Result<CloseLoopResult, EngineError>
    where
        J: crate::governor::JitterSource,
    {
        let now = || chrono::DateTime::from_timestamp_millis(self.clock.epoch_ms() as i64)
            .unwrap_or_else(chrono::Utc::now);

        let mut envelope = match resume {
            ResumeMode::Fresh => {
                let mut envelope = self.archive.create(
                    SessionKind::CloseLoop,
                    session_id,
                    now(),
                    json!({ "goal": goal.text, "subOverride": sub_override }),
                )?;
                envelope.policy = policy;
                envelope
            }
            ResumeMode::Resume { allow_drift } => {
                let existing = self
                    .archive
                    .load(SessionKind::CloseLoop, &session_id)?
                    .ok_or_else(|| {
                        EngineError::ResumeUnavailable(format!(
                            "no close-loop session '{session_id}' found to resume"
                        ))
                    })?;

                // Resume-from-completed is a no-op: the terminal outcome is
                // already durable, so we hand it back without touching the
                // archive again.
                if existing.status == SessionStatus::Completed {
                    let cycles = existing
                        .outputs
                        .get("cycles")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0) as u32;
                    return Ok(CloseLoopResult {
                        status: SessionStatus::Completed,
                        cycles,
                        last_summary: None,
                    });
                }

                if existing.is_finalized() {
                    return Err(EngineError::ResumeUnavailable(format!(
                        "session '{session_id}' already finalized as {:?}; start a new session instead",
                        existing.status
                    )));
                }

                if !existing.policy.is_null() && existing.policy != policy && !allow_drift {
                    return Err(EngineError::PolicyDrift(format!(
                        "saved policy for session '{session_id}' differs from the invoked flags; pass --allow-drift to override"
                    )));
                }

                existing
            }
        };

        let plan = self.decomposer.decompose(&goal, sub_override)?;
        self.archive.append_event(
            SessionKind::CloseLoop,
            &mut envelope,
            Event::new("decompose", now()).with_data(
                "sub_specs",
                serde_json::to_value(&plan.sub_specs).unwrap_or(serde_json::Value::Null),
            ),
        )?;

        let mut tasks = self.bootstrapper.bootstrap(&plan)?;
        self.archive.append_event(
            SessionKind::CloseLoop,
            &mut envelope,
            Event::new("bootstrap_specs", now()),
        )?;

        let mut cycles: u32 = 0;
        let mut consecutive_no_progress: u32 = 0;
        let mut best_success_count: Option<usize> = None;
        let mut last_summary: Option<OrchestrationSummary> = None;

        loop {
            let already_completed = std::collections::HashSet::new();
            let summary = orchestrator
                .orchestrate(tasks.clone(), &already_completed)
                .await;
            self.archive.append_event(
                SessionKind::CloseLoop,
                &mut envelope,
                Event::new("orchestrate", now())
                    .with_data("success_count", summary.success_count as i64)
                    .with_data("failure_count", summary.failure_count as i64),
            )?;

            let verdict = self.gate_evaluator.evaluate(&summary);
            let progressed = best_success_count.is_none_or_better(summary.success_count);
            best_success_count = Some(
                best_success_count
                    .map(|best| best.max(summary.success_count))
                    .unwrap_or(summary.success_count),
            );

            match verdict {
                GateVerdict::Pass => {
                    self.archive.append_event(
                        SessionKind::CloseLoop,
                        &mut envelope,
                        Event::new("gate", now()).with_data("verdict", "pass"),
                    )?;
                    self.archive.finalize(
                        SessionKind::CloseLoop,
                        &mut envelope,
                        SessionStatus::Completed,
                        json!({ "cycles": cycles, "success_rate": success_rate(&summary) }),
                        now(),
                    )?;
                    last_summary = Some(summary);
                    return Ok(CloseLoopResult {
                        status: SessionStatus::Completed,
                        cycles,
                        last_summary,
                    });
                }
                GateVerdict::PartialFailed(reasons) => {
                    self.archive.append_event(
                        SessionKind::CloseLoop,
                        &mut envelope,
                        Event::new("gate", now())
                            .with_data("verdict", "partial-failed")
                            .with_data(
                                "reasons",
                                serde_json::to_value(&reasons).unwrap_or(serde_json::Value::Null),
                            ),
                    )?;

                    cycles += 1;
                    if !progressed {
                        consecutive_no_progress += 1;
                    } else {
                        consecutive_no_progress = 0;
                    }

                    if !self.should_replan(cycles, consecutive_no_progress) {
                        let status = SessionStatus::PartialFailed;
                        self.archive.finalize(
                            SessionKind::CloseLoop,
                            &mut envelope,
                            status,
                            json!({ "cycles": cycles, "success_rate": success_rate(&summary) }),
                            now(),
                        )?;
                        last_summary = Some(summary);
                        return Ok(CloseLoopResult {
                            status,
                            cycles,
                            last_summary,
                        });
                    }

                    tasks = self.bootstrapper.replan(&plan, &summary)?;
                    last_summary = Some(summary);
                    self.archive.append_event(
                        SessionKind::CloseLoop,
                        &mut envelope,
                        Event::new("replan_cycle", now()).with_data("cycle", cycles as i64),
                    )?;
                }
                GateVerdict::Failed(reasons) => {
                    self.archive.append_event(
                        SessionKind::CloseLoop,
                        &mut envelope,
                        Event::new("gate", now())
                            .with_data("verdict", "failed")
                            .with_data(
                                "reasons",
                                serde_json::to_value(&reasons).unwrap_or(serde_json::Value::Null),
                            ),
                    )?;

                    cycles += 1;
                    if !progressed {
                        consecutive_no_progress += 1;
                    } else {
                        consecutive_no_progress = 0;
                    }

                    if !self.should_replan(cycles, consecutive_no_progress) {
                        self.archive.finalize(
                            SessionKind::CloseLoop,
                            &mut envelope,
                            SessionStatus::Failed,
                            json!({ "cycles": cycles, "success_rate": success_rate(&summary) }),
                            now(),
                        )?;
                        last_summary = Some(summary);
                        return Ok(CloseLoopResult {
                            status: SessionStatus::Failed,
                            cycles,
                            last_summary,
                        });
                    }

                    tasks = self.bootstrapper.replan(&plan, &summary)?;
                    last_summary = Some(summary);
                    self.archive.append_event(
                        SessionKind::CloseLoop,
                        &mut envelope,
                        Event::new("replan_cycle", now()).with_data("cycle", cycles as i64),
                    )?;
                }
            }
        }
    }

    fn should_replan(&self, cycles: u32, consecutive_no_progress: u32) -> bool {
        match self.replan_strategy {
            ReplanStrategy::Fixed { replan_attempts } => cycles <= replan_attempts,
            ReplanStrategy::Adaptive {
                replan_attempts,
                no_progress_window,
            } => cycles <= replan_attempts && consecutive_no_progress < no_progress_window,
        }
    }
}

/// Fraction of specs that succeeded in one orchestration cycle, persisted
/// on the session's `outputs` so a later run can read recent sessions back
/// as a success-rate baseline (§4.6 GATE's success-rate-drop-vs-baseline
/// gate).
fn success_rate(summary: &OrchestrationSummary) -> f64 {
    let total = summary.success_count + summary.failure_count;
    if total == 0 {
        0.0
    } else {
        summary.success_count as f64 / total as f64
    }
}

trait ProgressCheck {
    fn is_none_or_better(&self, candidate: usize) -> bool;
}

impl ProgressCheck for Option<usize> {
    fn is_none_or_better(&self, candidate: usize) -> bool {
        match self {
            None => true,
            Some(best) => candidate > *best,
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

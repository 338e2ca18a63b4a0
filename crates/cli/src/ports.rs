// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete wiring between the library crates' ports and this process's
//! filesystem/subprocess reality: `ac_specs`'s plain functions become
//! `ac_engine::runner`'s `GoalDecomposer`/`SpecBootstrapper`/`GateEvaluator`
//! traits, and a full close-loop run becomes one
//! `ac_control::batch::GoalRunner` attempt.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ac_adapters::{AiAdapter, ClaudeLikeAdapter};
use ac_control::release_gate::RiskLevel;
use ac_core::{Clock, Goal, SessionId, SessionKind};
use ac_engine::governor::RateLimitProfile;
use ac_engine::orchestrator::{AgentOrchestrator, OrchestrationSummary, SpecTask};
use ac_engine::runner::{
    CloseLoopRunner, DecomposePlan, GateEvaluator, GateVerdict, GoalDecomposer, ResumeMode,
    SpecBootstrapper,
};
use ac_engine::EngineError;
use ac_specs::decompose::SpecPlan;
use ac_specs::{bootstrap_plan, complexity_score, decompose_goal, discover_specs, replan_plan};
use ac_storage::SessionArchive;

use ac_control::batch::{GoalRunOutcome, GoalRunner, GoalStatus};
use ac_control::controller::{ControllerGoalOutcome, ProgramRunnerPort};
use ac_control::ControlError;

use crate::config::AppConfig;

fn to_decompose_plan(plan: SpecPlan) -> DecomposePlan {
    DecomposePlan {
        master_spec: plan.master_spec,
        sub_specs: plan.sub_specs,
    }
}

fn to_spec_plan(plan: &DecomposePlan) -> SpecPlan {
    SpecPlan {
        master_spec: plan.master_spec.clone(),
        sub_specs: plan.sub_specs.clone(),
    }
}

/// Adapts `ac_specs::decompose_goal` to [`GoalDecomposer`], seeding the
/// goal-index sequence from whatever spec directories already exist under
/// the project root.
pub struct SpecsGoalDecomposer {
    pub project_root: PathBuf,
}

impl GoalDecomposer for SpecsGoalDecomposer {
    fn decompose(&self, goal: &Goal, sub_override: Option<u8>) -> Result<DecomposePlan, EngineError> {
        let existing = discover_specs(&self.project_root)
            .map_err(|e| EngineError::Bootstrap(e.to_string()))?;
        let names: Vec<String> = existing.iter().map(|b| b.id().as_str().to_string()).collect();
        let plan = decompose_goal(goal, sub_override, names.iter().map(String::as_str));
        Ok(to_decompose_plan(plan))
    }
}

/// Adapts `ac_specs::bootstrap_plan`/`replan_plan` to [`SpecBootstrapper`].
/// `goal` is captured at construction time since the trait's methods take
/// only the plan, not the originating goal.
pub struct SpecsBootstrapper<C: Clock> {
    pub project_root: PathBuf,
    pub goal: Goal,
    pub clock: C,
}

fn draft_to_task(draft: ac_specs::SpecTaskDraft) -> SpecTask {
    SpecTask {
        spec_id: draft.spec_id,
        workspace_path: draft.workspace_path,
        prompt: draft.prompt,
        env: Vec::new(),
        dependencies: Vec::new(),
        criticality: draft.criticality,
    }
}

impl<C: Clock> SpecBootstrapper for SpecsBootstrapper<C> {
    fn bootstrap(&self, plan: &DecomposePlan) -> Result<Vec<SpecTask>, EngineError> {
        let spec_plan = to_spec_plan(plan);
        let now = ac_storage::epoch_ms_to_datetime(self.clock.epoch_ms());
        let drafts = bootstrap_plan(&self.project_root, &spec_plan, &self.goal, now)
            .map_err(|e| EngineError::Bootstrap(e.to_string()))?;
        Ok(drafts.into_iter().map(draft_to_task).collect())
    }

    fn replan(
        &self,
        plan: &DecomposePlan,
        prior: &OrchestrationSummary,
    ) -> Result<Vec<SpecTask>, EngineError> {
        let spec_plan = to_spec_plan(plan);
        let failed: HashSet<_> = prior
            .outcomes
            .iter()
            .filter(|o| o.status == ac_engine::orchestrator::SpecResultStatus::Failed)
            .map(|o| o.spec_id.clone())
            .collect();
        let drafts = replan_plan(&self.project_root, &spec_plan, &self.goal, &failed)
            .map_err(|e| EngineError::Bootstrap(e.to_string()))?;
        Ok(drafts.into_iter().map(draft_to_task).collect())
    }
}

/// Evaluates the Definition-of-Done gates (§4.6 GATE) against one
/// orchestration cycle: minimum success rate, maximum observed risk
/// level, maximum success-rate drop versus a recent baseline, an optional
/// tests-gate shell command, every bootstrapped spec's tasks closed,
/// required docs present, the collaboration status of every spec
/// terminal, and the project's spec dependency graph still acyclic.
pub struct DodGateEvaluator {
    pub project_root: PathBuf,
    pub min_success_rate: f64,
    pub max_risk_level: RiskLevel,
    pub max_success_rate_drop: f64,
    /// Mean success rate over the last N completed close-loop sessions,
    /// or `None` when there's no prior session to compare against.
    pub baseline_success_rate: Option<f64>,
    pub tests_command: Option<String>,
    pub tests_timeout: Duration,
}

/// Buckets an orchestration cycle's failure count into a risk level, the
/// same coarse bucketing `commands::governance` uses for signal counts.
fn observed_risk(summary: &OrchestrationSummary) -> RiskLevel {
    match summary.failure_count {
        0 => RiskLevel::Low,
        1..=2 => RiskLevel::Medium,
        3..=4 => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}

/// Mean `outputs.success_rate` across the most recent `window` close-loop
/// sessions (newest first, per [`SessionArchive::list`]), used as the DoD
/// gate's baseline for the success-rate-drop check.
fn recent_baseline_success_rate(archive: &SessionArchive, window: usize) -> Option<f64> {
    let sessions = archive.list(SessionKind::CloseLoop).ok()?;
    let rates: Vec<f64> = sessions
        .iter()
        .filter_map(|envelope| envelope.outputs.get("success_rate").and_then(|v| v.as_f64()))
        .take(window)
        .collect();
    if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }
}

impl DodGateEvaluator {
    /// Runs the tests-gate shell command, if configured. `GateEvaluator` is
    /// a synchronous trait (the close-loop runner evaluates it between
    /// orchestration cycles without its own async context), so the async
    /// `ac_shell::run_test_gate` call is bridged onto the current Tokio
    /// runtime with `block_in_place`.
    fn run_tests_gate(&self) -> Option<String> {
        let command = self.tests_command.as_ref()?;
        let outcome = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(ac_shell::run_test_gate(command, &self.project_root, self.tests_timeout))
        });
        match outcome {
            Ok(result) if result.passed => None,
            Ok(result) => Some(format!("tests-gate-failed:exit={:?}", result.exit_code)),
            Err(e) => Some(format!("tests-gate-error:{e}")),
        }
    }

    fn check_specs(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        let bundles = match discover_specs(&self.project_root) {
            Ok(b) => b,
            Err(e) => {
                reasons.push(format!("spec-discovery-error:{e}"));
                return reasons;
            }
        };
        for bundle in &bundles {
            if !bundle.required_docs_present() {
                reasons.push(format!("docs-incomplete:{}", bundle.id()));
            }
            match bundle.task_completion() {
                Ok(completion) if !completion.is_closed() => {
                    reasons.push(format!(
                        "tasks-not-closed:{}:{}/{}",
                        bundle.id(),
                        completion.closed,
                        completion.total
                    ));
                }
                Err(e) => reasons.push(format!("task-completion-error:{}:{e}", bundle.id())),
                _ => {}
            }
            match bundle.load_collaboration() {
                Ok(Some(collaboration)) if !collaboration.status.current.is_terminal() => {
                    reasons.push(format!(
                        "collaboration-not-terminal:{}:{:?}",
                        bundle.id(),
                        collaboration.status.current
                    ));
                }
                Ok(_) => {}
                Err(e) => reasons.push(format!("collaboration-load-error:{}:{e}", bundle.id())),
            }
        }
        if let Err(e) = ac_specs::check_project_acyclic(&self.project_root) {
            reasons.push(format!("dependency-graph-cyclic:{e}"));
        }
        reasons
    }
}

impl GateEvaluator for DodGateEvaluator {
    fn evaluate(&self, summary: &OrchestrationSummary) -> GateVerdict {
        let total = summary.success_count + summary.failure_count;
        let success_rate = if total == 0 { 0.0 } else { summary.success_count as f64 / total as f64 };

        let mut reasons = Vec::new();
        if success_rate < self.min_success_rate {
            reasons.push(format!(
                "success-rate-below-threshold:{success_rate:.2}/{:.2}",
                self.min_success_rate
            ));
        }
        let risk = observed_risk(summary);
        if risk > self.max_risk_level {
            reasons.push(format!(
                "risk-level-above-threshold:{risk:?}/{:?}",
                self.max_risk_level
            ));
        }
        if let Some(baseline) = self.baseline_success_rate {
            let drop = baseline - success_rate;
            if drop > self.max_success_rate_drop {
                reasons.push(format!(
                    "success-rate-drop-vs-baseline:{drop:.2}>{:.2}",
                    self.max_success_rate_drop
                ));
            }
        }
        if let Some(reason) = self.run_tests_gate() {
            reasons.push(reason);
        }
        reasons.extend(self.check_specs());

        if reasons.is_empty() {
            GateVerdict::Pass
        } else if summary.success_count > 0 {
            GateVerdict::PartialFailed(reasons)
        } else {
            GateVerdict::Failed(reasons)
        }
    }
}

/// Drives one goal through the full close-loop state machine and reports
/// it as a [`GoalRunOutcome`], so a batch/program/controller run can treat
/// "run one goal" uniformly regardless of which surface invoked it.
pub struct CloseLoopGoalRunner<C: Clock> {
    pub clock: C,
    pub project_root: PathBuf,
    pub archive: SessionArchive,
    pub adapter: Arc<dyn AiAdapter>,
    pub config: AppConfig,
}

impl<C: Clock + Clone> CloseLoopGoalRunner<C> {
    /// `resume`/`allow_drift` surface `--resume`/`--allow-drift`; batch,
    /// program, and controller runs always pass `resume: false` since
    /// resume is a single-goal `close-loop` concern (§4.6).
    pub async fn run_one(
        &self,
        goal: Goal,
        session_id: SessionId,
        sub_override: Option<u8>,
        resume: bool,
        allow_drift: bool,
    ) -> Result<GoalRunOutcome, ControlError> {
        let start = std::time::Instant::now();
        let decomposer = SpecsGoalDecomposer {
            project_root: self.project_root.clone(),
        };
        let bootstrapper = SpecsBootstrapper {
            project_root: self.project_root.clone(),
            goal: goal.clone(),
            clock: self.clock.clone(),
        };
        let baseline_success_rate =
            recent_baseline_success_rate(&self.archive, self.config.success_rate_baseline_window);
        let gate_evaluator = DodGateEvaluator {
            project_root: self.project_root.clone(),
            min_success_rate: self.config.min_success_rate,
            max_risk_level: self.config.max_risk_level,
            max_success_rate_drop: self.config.max_success_rate_drop,
            baseline_success_rate,
            tests_command: Some(self.config.tests_command.clone()),
            tests_timeout: Duration::from_secs(self.config.tests_timeout_secs),
        };
        let mut runner = CloseLoopRunner::new(
            self.clock.clone(),
            self.archive.clone(),
            decomposer,
            bootstrapper,
            gate_evaluator,
            self.config.replan_strategy(),
        );
        let orchestrator_config = self.config.orchestrator_config();
        let mut orchestrator = AgentOrchestrator::new(self.clock.clone(), self.adapter.clone(), orchestrator_config);

        let policy = serde_json::json!({
            "min_success_rate": self.config.min_success_rate,
            "max_risk_level": format!("{:?}", self.config.max_risk_level),
            "max_success_rate_drop": self.config.max_success_rate_drop,
            "replan_strategy_mode": format!("{:?}", self.config.replan_strategy_mode),
            "replan_attempts": self.config.replan_attempts,
            "tests_command": self.config.tests_command,
            "sub_override": sub_override,
        });
        let resume_mode = if resume {
            ResumeMode::Resume { allow_drift }
        } else {
            ResumeMode::Fresh
        };

        let result = runner
            .run(
                goal.clone(),
                session_id.clone(),
                sub_override,
                &mut orchestrator,
                resume_mode,
                policy,
            )
            .await
            .map_err(ControlError::from)?;

        let status = match result.status {
            ac_core::SessionStatus::Completed => GoalStatus::Completed,
            ac_core::SessionStatus::PartialFailed => GoalStatus::PartialFailed,
            _ => GoalStatus::Failed,
        };
        let summary = result.last_summary.unwrap_or_default();
        Ok(GoalRunOutcome {
            goal_text: goal.text,
            session_id,
            status,
            sub_spec_count: 0,
            replan_cycles: result.cycles,
            rate_limit_signals: summary.total_rate_limit_signals,
            backoff_ms: summary.total_backoff_ms,
            elapsed: start.elapsed(),
        })
    }
}

#[async_trait]
impl<C: Clock + Clone + 'static> GoalRunner for CloseLoopGoalRunner<C> {
    async fn run_goal(&self, goal: Goal, session_id: SessionId) -> Result<GoalRunOutcome, ControlError> {
        self.run_one(goal, session_id, None, false, false).await
    }
}

#[async_trait]
impl<C: Clock + Clone + 'static> ProgramRunnerPort for CloseLoopGoalRunner<C> {
    async fn run_goal(&mut self, goal: Goal, session_id: SessionId) -> Result<ControllerGoalOutcome, ControlError> {
        let outcome = self.run_one(goal, session_id.clone(), None, false, false).await?;
        Ok(ControllerGoalOutcome {
            goal_text: outcome.goal_text,
            session_id: outcome.session_id,
            passed: outcome.status == GoalStatus::Completed,
        })
    }
}

/// Builds a [`ClaudeLikeAdapter`] from project configuration.
pub fn build_adapter(config: &AppConfig) -> Arc<dyn AiAdapter> {
    let mut adapter = ClaudeLikeAdapter::new(config.adapter_command.clone(), config.adapter_args.clone());
    if let Some(var) = &config.api_key_env_var {
        adapter = adapter.with_api_key_env_var(var.clone());
    }
    Arc::new(adapter)
}

pub fn rate_limit_profile(config: &AppConfig) -> RateLimitProfile {
    config.rate_limit_profile
}

/// A goal's rough complexity, used only for display/triage (`ac_control`
/// has its own internal scorer it uses for batch scheduling priority).
pub fn goal_complexity(goal: &Goal) -> f64 {
    complexity_score(&goal.text)
}

/// Allocates a new session id: `{yyyymmddhhmmss}-{short random suffix}`, per
/// the `SessionId` doc comment's sortable-timestamp convention, unless the
/// operator pinned one with `--session-id`.
pub fn new_session_id<C: Clock>(clock: &C, pinned: Option<String>) -> SessionId {
    if let Some(id) = pinned {
        return SessionId::new(id);
    }
    let now = ac_storage::epoch_ms_to_datetime(clock.epoch_ms());
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    SessionId::new(format!("{}-{}", now.format("%Y%m%d%H%M%S"), &suffix[..8]))
}

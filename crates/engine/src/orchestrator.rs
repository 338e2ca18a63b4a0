// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Orchestrator (§4.5): drives a bounded worker pool of sub-agent
//! subprocess attempts across a batch of ready specs, mediating every
//! launch and retry through a [`RateLimitGovernor`].
//!
//! Each launch mints a fresh `AgentId::new(Uuid::new_v4())` and opens one
//! tracing span per sub-agent attempt, so a launch's whole lifecycle
//! (spawn, retries, rate-limit backoff) nests under a single span.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use uuid::Uuid;

use ac_adapters::{AgentExitClass, AgentRequest, AiAdapter};
use ac_core::{AgentId, Clock, Dependency, DependencyType, SpecId};

use crate::governor::{JitterSource, RateLimitGovernor, RateLimitProfile, SignalOutcome};

/// One spec queued for the orchestrator to drive to completion.
#[derive(Debug, Clone)]
pub struct SpecTask {
    pub spec_id: SpecId,
    pub workspace_path: PathBuf,
    pub prompt: String,
    pub env: Vec<(String, String)>,
    pub dependencies: Vec<Dependency>,
    /// Higher sorts first among otherwise-ready specs (ontology
    /// `agent_hints` criticality score, when enabled). Ties fall back to
    /// declared order.
    pub criticality: i64,
}

/// Bounds and policy for one orchestration run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_parallel: usize,
    pub agent_budget: usize,
    pub timeout: Duration,
    pub max_retries: u32,
    pub rate_limit_profile: RateLimitProfile,
}

/// Terminal outcome of one spec's orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecResultStatus {
    Success,
    Failed,
}

/// Per-spec result, matching §4.5's output contract.
#[derive(Debug, Clone)]
pub struct SpecOutcome {
    pub spec_id: SpecId,
    pub status: SpecResultStatus,
    pub attempts: u32,
    pub rate_limit_signals: u32,
    pub elapsed: Duration,
    pub stdout_excerpt: String,
    pub exit_code: Option<i32>,
}

/// Aggregate result of one orchestration run.
#[derive(Debug, Clone, Default)]
pub struct OrchestrationSummary {
    pub outcomes: Vec<SpecOutcome>,
    pub success_count: usize,
    pub failure_count: usize,
    pub total_rate_limit_signals: u32,
    pub total_backoff_ms: u64,
}

struct SpecProgress {
    task: SpecTask,
    attempts: u32,
    rate_limit_signals: u32,
    elapsed: Duration,
    last_stdout_excerpt: String,
    last_exit_code: Option<i32>,
    backoff_until: Option<std::time::Instant>,
}

/// Drives a batch of specs to completion, bounded by
/// `min(maxParallel, agentBudget, governor.currentParallelCap)`.
pub struct AgentOrchestrator<C: Clock, J: JitterSource = crate::governor::RandomJitter> {
    clock: C,
    adapter: Arc<dyn AiAdapter>,
    governor: RateLimitGovernor<J>,
    config: OrchestratorConfig,
}

impl<C: Clock> AgentOrchestrator<C, crate::governor::RandomJitter> {
    pub fn new(clock: C, adapter: Arc<dyn AiAdapter>, config: OrchestratorConfig) -> Self {
        let ceiling = effective_ceiling(&config);
        let governor = RateLimitGovernor::new(config.rate_limit_profile, ceiling, clock.now());
        Self {
            clock,
            adapter,
            governor,
            config,
        }
    }
}

impl<C: Clock, J: JitterSource> AgentOrchestrator<C, J> {
    pub fn with_jitter(
        clock: C,
        adapter: Arc<dyn AiAdapter>,
        config: OrchestratorConfig,
        jitter: J,
    ) -> Self {
        let ceiling = effective_ceiling(&config);
        let governor =
            RateLimitGovernor::with_jitter(config.rate_limit_profile, ceiling, clock.now(), jitter);
        Self {
            clock,
            adapter,
            governor,
            config,
        }
    }

    /// Run every task in `tasks` to a terminal outcome. `already_completed`
    /// names specs (from prior cycles or prior batches in the same
    /// close-loop run) whose `RequiresCompletion` dependencies are
    /// satisfied without needing to appear in `tasks`.
    pub async fn orchestrate(
        &mut self,
        tasks: Vec<SpecTask>,
        already_completed: &HashSet<SpecId>,
    ) -> OrchestrationSummary {
        let mut completed: HashSet<SpecId> = already_completed.clone();
        let mut pending: HashMap<SpecId, SpecProgress> = tasks
            .into_iter()
            .map(|task| {
                (
                    task.spec_id.clone(),
                    SpecProgress {
                        task,
                        attempts: 0,
                        rate_limit_signals: 0,
                        elapsed: Duration::ZERO,
                        last_stdout_excerpt: String::new(),
                        last_exit_code: None,
                        backoff_until: None,
                    },
                )
            })
            .collect();

        let mut outcomes: Vec<SpecOutcome> = Vec::new();
        let mut in_flight: JoinSet<(SpecId, AttemptResult)> = JoinSet::new();
        let mut launched: HashSet<SpecId> = HashSet::new();
        let mut total_backoff_ms: u64 = 0;

        loop {
            self.governor.maybe_restore_parallel_cap(self.clock.now());

            if pending.is_empty() && in_flight.is_empty() {
                break;
            }

            let cap = effective_ceiling(&self.config).min(self.governor.current_parallel_cap());
            if in_flight.len() < cap && !self.governor.is_backoff_active(self.clock.now()) {
                let ready = self.select_ready(&pending, &completed, &launched);
                for spec_id in ready.into_iter().take(cap - in_flight.len()) {
                    if !self.governor.try_acquire_launch_token(self.clock.now()) {
                        break;
                    }
                    launched.insert(spec_id.clone());
                    #[allow(clippy::expect_used)]
                    let progress = pending.get_mut(&spec_id).expect("ready spec is pending");
                    progress.attempts += 1;
                    let adapter = Arc::clone(&self.adapter);
                    let request = AgentRequest {
                        agent_id: AgentId::new(Uuid::new_v4().to_string()),
                        spec_id: spec_id.clone(),
                        workspace_path: progress.task.workspace_path.clone(),
                        prompt: progress.task.prompt.clone(),
                        env: progress.task.env.clone(),
                        timeout: self.config.timeout,
                    };
                    in_flight.spawn(async move {
                        let outcome = adapter.run(&request).await;
                        (spec_id, AttemptResult(outcome))
                    });
                }
            }

            if in_flight.is_empty() {
                // Nothing launched this round and nothing is running. Either
                // every remaining spec is merely waiting out a backoff
                // window (sleep until the earliest one clears and retry
                // scheduling), or none will ever become ready (an
                // unsatisfiable dependency) and they fail outright.
                let now = self.clock.now();
                let next_wake = pending
                    .values()
                    .filter_map(|p| p.backoff_until)
                    .filter(|until| *until > now)
                    .min();
                match next_wake {
                    Some(wake_at) => {
                        tokio::time::sleep(wake_at.saturating_duration_since(now)).await;
                        continue;
                    }
                    None => {
                        for (spec_id, progress) in pending.drain() {
                            outcomes.push(terminal_failure(spec_id, &progress));
                        }
                        break;
                    }
                }
            }

            let Some(joined) = in_flight.join_next().await else {
                unreachable!("in_flight was just checked non-empty");
            };
            #[allow(clippy::expect_used)]
            let (spec_id, AttemptResult(result)) =
                joined.expect("attempt task panicked unexpectedly");
            launched.remove(&spec_id);

            #[allow(clippy::expect_used)]
            let progress = pending.get_mut(&spec_id).expect("attempt spec is pending");
            match result {
                Ok(outcome) => {
                    progress.elapsed += outcome.elapsed;
                    progress.last_stdout_excerpt = outcome.stdout_excerpt(4000);
                    progress.last_exit_code = outcome.exit_code;
                    match outcome.exit_class {
                        AgentExitClass::Success => {
                            self.governor.record_clean_outcome(spec_id.as_str());
                            #[allow(clippy::expect_used)]
                            let progress = pending.remove(&spec_id).expect("just matched");
                            completed.insert(spec_id.clone());
                            outcomes.push(SpecOutcome {
                                spec_id,
                                status: SpecResultStatus::Success,
                                attempts: progress.attempts,
                                rate_limit_signals: progress.rate_limit_signals,
                                elapsed: progress.elapsed,
                                stdout_excerpt: progress.last_stdout_excerpt,
                                exit_code: progress.last_exit_code,
                            });
                        }
                        AgentExitClass::RetryableFailure => {
                            if progress.attempts >= self.config.max_retries {
                                #[allow(clippy::expect_used)]
                                let progress = pending.remove(&spec_id).expect("just matched");
                                outcomes.push(terminal_failure(spec_id, &progress));
                            }
                        }
                        AgentExitClass::RateLimited => {
                            progress.rate_limit_signals += 1;
                            let retry_after = outcome.rate_limit_signal.and_then(|s| s.retry_after);
                            match self.governor.record_rate_limit_signal(
                                spec_id.as_str(),
                                progress.attempts,
                                retry_after,
                                self.clock.now(),
                            ) {
                                SignalOutcome::Backoff(wait) => {
                                    total_backoff_ms += wait.as_millis() as u64;
                                    progress.backoff_until = Some(self.clock.now() + wait);
                                }
                                SignalOutcome::RetriesExhausted => {
                                    #[allow(clippy::expect_used)]
                                    let progress = pending.remove(&spec_id).expect("just matched");
                                    outcomes.push(terminal_failure(spec_id, &progress));
                                }
                            }
                        }
                        AgentExitClass::Fatal => {
                            #[allow(clippy::expect_used)]
                            let progress = pending.remove(&spec_id).expect("just matched");
                            outcomes.push(terminal_failure(spec_id, &progress));
                        }
                    }
                }
                Err(_adapter_error) => {
                    if progress.attempts >= self.config.max_retries {
                        #[allow(clippy::expect_used)]
                        let progress = pending.remove(&spec_id).expect("just matched");
                        outcomes.push(terminal_failure(spec_id, &progress));
                    }
                }
            }
        }

        summarize(outcomes, total_backoff_ms)
    }

    fn select_ready(
        &self,
        pending: &HashMap<SpecId, SpecProgress>,
        completed: &HashSet<SpecId>,
        launched: &HashSet<SpecId>,
    ) -> Vec<SpecId> {
        let now = self.clock.now();
        let mut ready: Vec<&SpecProgress> = pending
            .values()
            .filter(|p| !launched.contains(&p.task.spec_id))
            .filter(|p| p.backoff_until.map_or(true, |until| until <= now))
            .filter(|p| dependencies_satisfied(&p.task.dependencies, completed))
            .collect();
        ready.sort_by(|a, b| b.task.criticality.cmp(&a.task.criticality));
        ready.into_iter().map(|p| p.task.spec_id.clone()).collect()
    }
}

struct AttemptResult(Result<ac_adapters::AgentOutcome, ac_adapters::AdapterError>);

fn dependencies_satisfied(dependencies: &[Dependency], completed: &HashSet<SpecId>) -> bool {
    dependencies
        .iter()
        .filter(|dep| dep.kind == DependencyType::RequiresCompletion)
        .all(|dep| completed.contains(&dep.spec))
}

fn effective_ceiling(config: &OrchestratorConfig) -> usize {
    config.max_parallel.min(config.agent_budget).max(1)
}

fn terminal_failure(spec_id: SpecId, progress: &SpecProgress) -> SpecOutcome {
    SpecOutcome {
        spec_id,
        status: SpecResultStatus::Failed,
        attempts: progress.attempts,
        rate_limit_signals: progress.rate_limit_signals,
        elapsed: progress.elapsed,
        stdout_excerpt: progress.last_stdout_excerpt.clone(),
        exit_code: progress.last_exit_code,
    }
}

fn summarize(outcomes: Vec<SpecOutcome>, total_backoff_ms: u64) -> OrchestrationSummary {
    let success_count = outcomes
        .iter()
        .filter(|o| o.status == SpecResultStatus::Success)
        .count();
    let failure_count = outcomes.len() - success_count;
    let total_rate_limit_signals = outcomes.iter().map(|o| o.rate_limit_signals).sum();
    OrchestrationSummary {
        success_count,
        failure_count,
        total_rate_limit_signals,
        total_backoff_ms,
        outcomes,
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

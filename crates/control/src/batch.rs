// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch Runner (§4.7): executes N goals under a shared agent budget,
//! priority scheduling, anti-starvation aging, and round-based retry.
//!
//! Each goal's actual close-loop execution is delegated to a
//! [`GoalRunner`] port, the same generic-collaborator shape
//! `ac_engine::CloseLoopRunner` uses for its decompose/bootstrap/gate
//! ports — the batch runner's job is scheduling and budget bookkeeping,
//! not driving any one goal itself.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ac_core::{Goal, SessionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::error::ControlError;

/// One goal's outcome from a close-loop run, as reported back to the
/// batch scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRunOutcome {
    pub goal_text: String,
    pub session_id: SessionId,
    pub status: GoalStatus,
    pub sub_spec_count: u32,
    pub replan_cycles: u32,
    pub rate_limit_signals: u32,
    pub backoff_ms: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Completed,
    PartialFailed,
    Failed,
}

/// Drives one goal through a full close-loop run.
///
/// `&self`, not `&mut self`: [`run_batch`] shares one runner across
/// concurrently in-flight goals via [`Arc`], the same way
/// `ac_engine::AgentOrchestrator` shares its adapter.
#[async_trait]
pub trait GoalRunner: Send + Sync {
    async fn run_goal(
        &self,
        goal: Goal,
        session_id: SessionId,
    ) -> Result<GoalRunOutcome, ControlError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleStrategy {
    Fifo,
    ComplexFirst,
    ComplexLast,
    CriticalFirst,
}

impl Default for ScheduleStrategy {
    fn default() -> Self {
        ScheduleStrategy::ComplexFirst
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryMode {
    None,
    UntilComplete,
    Adaptive,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_parallel: usize,
    pub batch_agent_budget: usize,
    pub strategy: ScheduleStrategy,
    pub aging_factor: f64,
    pub retry_mode: RetryMode,
    pub batch_retry_max_rounds: u32,
    pub continue_on_error: bool,
    /// Rate-limit signals observed in a round, at or above which the
    /// adaptive retry mode halves `batch_parallel`/`batch_agent_budget`
    /// for the next round.
    pub sustained_pressure_threshold: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_parallel: 4,
            batch_agent_budget: 8,
            strategy: ScheduleStrategy::default(),
            aging_factor: 1.0,
            retry_mode: RetryMode::None,
            batch_retry_max_rounds: 2,
            continue_on_error: true,
            sustained_pressure_threshold: 3,
        }
    }
}

/// Resource-planning telemetry surfaced in the batch summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePlan {
    pub configured_parallel: usize,
    pub configured_agent_budget: usize,
    pub effective_parallel: usize,
    pub strategy: ScheduleStrategy,
    pub aging_factor: f64,
    pub total_wait: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub success_rate: f64,
    pub completed: usize,
    pub partial_failed: usize,
    pub failed: usize,
    pub avg_sub_specs: f64,
    pub avg_replan_cycles: f64,
    pub total_rate_limit_signals: u32,
    pub avg_rate_limit_signals: f64,
    pub total_backoff_ms: u64,
}

/// One retry round's backpressure decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRetryRound {
    pub round: u32,
    pub requeued: usize,
    pub rate_limit_signals_observed: u32,
    pub halved_budget: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_session: SessionId,
    pub goal_outcomes: Vec<GoalRunOutcome>,
    pub resource_plan: ResourcePlan,
    pub metrics: BatchMetrics,
    pub batch_retry: Vec<BatchRetryRound>,
}

/// Estimate a goal's scheduling "complexity" from its text: longer, more
/// multi-clause goals schedule first under `complex-first` and last under
/// `complex-last`. A crude proxy, but a stable and explainable one.
fn complexity_score(goal: &Goal) -> usize {
    goal.text.split(|c: char| c == ',' || c == ';' || c == '.').count() + goal.text.split_whitespace().count()
}

struct Queued {
    goal: Goal,
    criticality: i64,
    waiting_cycles: u32,
}

fn priority(q: &Queued, strategy: ScheduleStrategy, aging_factor: f64) -> f64 {
    let base = match strategy {
        ScheduleStrategy::Fifo => 0.0,
        ScheduleStrategy::ComplexFirst => complexity_score(&q.goal) as f64,
        ScheduleStrategy::ComplexLast => -(complexity_score(&q.goal) as f64),
        ScheduleStrategy::CriticalFirst => q.criticality as f64,
    };
    base + aging_factor * q.waiting_cycles as f64
}

/// Run `goals` through `runner` under `config`, scheduling up to
/// `min(batch_parallel, batch_agent_budget)` concurrently (via a
/// [`JoinSet`], mirroring `ac_engine::AgentOrchestrator::orchestrate`) and
/// retrying failed goals for up to `batch_retry_max_rounds` rounds.
pub async fn run_batch<R: GoalRunner + 'static>(
    runner: R,
    goals: Vec<Goal>,
    config: BatchConfig,
    batch_session: SessionId,
) -> Result<BatchSummary, ControlError> {
    let runner = Arc::new(runner);
    let mut effective_parallel = config.batch_parallel.min(config.batch_agent_budget).max(1);

    let mut queue: VecDeque<Queued> = goals
        .into_iter()
        .map(|goal| Queued {
            goal,
            criticality: 0,
            waiting_cycles: 0,
        })
        .collect();

    let mut outcomes: Vec<GoalRunOutcome> = Vec::new();
    let mut retry_history: Vec<BatchRetryRound> = Vec::new();
    let start = Instant::now();
    let mut round: u32 = 0;
    let mut sequence: u64 = 0;

    loop {
        let mut ordered: Vec<Queued> = queue.drain(..).collect();
        ordered.sort_by(|a, b| {
            priority(b, config.strategy, config.aging_factor)
                .partial_cmp(&priority(a, config.strategy, config.aging_factor))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut round_failures: Vec<Goal> = Vec::new();
        let mut round_rate_limit_signals: u32 = 0;

        let mut in_flight: JoinSet<(Goal, Result<GoalRunOutcome, ControlError>)> = JoinSet::new();
        for (index, queued) in ordered.into_iter().enumerate() {
            if index >= effective_parallel {
                queue.push_back(Queued {
                    waiting_cycles: queued.waiting_cycles + 1,
                    ..queued
                });
                continue;
            }

            sequence += 1;
            let session_id = SessionId::new(format!("{}-{:04}", batch_session.as_str(), sequence));
            let runner = Arc::clone(&runner);
            let goal = queued.goal.clone();
            let spawned_goal = goal.clone();
            in_flight.spawn(async move {
                let outcome = runner.run_goal(spawned_goal, session_id).await;
                (goal, outcome)
            });
        }

        let mut first_error: Option<ControlError> = None;
        while let Some(joined) = in_flight.join_next().await {
            let (goal, result) = joined.expect("goal run task panicked unexpectedly");
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(err) => {
                    first_error.get_or_insert(err);
                    continue;
                }
            };
            round_rate_limit_signals += outcome.rate_limit_signals;

            let failed = matches!(outcome.status, GoalStatus::Failed | GoalStatus::PartialFailed);
            if failed {
                round_failures.push(goal);
                if !config.continue_on_error {
                    outcomes.push(outcome);
                    in_flight.abort_all();
                    return Ok(finish(
                        batch_session,
                        outcomes,
                        retry_history,
                        &config,
                        effective_parallel,
                        start.elapsed(),
                    ));
                }
            }
            outcomes.push(outcome);
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        round += 1;
        let should_retry = !round_failures.is_empty()
            && config.retry_mode != RetryMode::None
            && round <= config.batch_retry_max_rounds;

        let halved = config.retry_mode == RetryMode::Adaptive
            && round_rate_limit_signals >= config.sustained_pressure_threshold;
        if halved {
            effective_parallel = (effective_parallel / 2).max(1);
        }

        retry_history.push(BatchRetryRound {
            round,
            requeued: round_failures.len(),
            rate_limit_signals_observed: round_rate_limit_signals,
            halved_budget: halved,
        });

        if !should_retry {
            break;
        }
        if config.retry_mode == RetryMode::UntilComplete && round_failures.is_empty() {
            break;
        }

        for goal in round_failures {
            queue.push_back(Queued {
                goal,
                criticality: 0,
                waiting_cycles: 0,
            });
        }
    }

    Ok(finish(
        batch_session,
        outcomes,
        retry_history,
        &config,
        effective_parallel,
        start.elapsed(),
    ))
}

fn finish(
    batch_session: SessionId,
    outcomes: Vec<GoalRunOutcome>,
    batch_retry: Vec<BatchRetryRound>,
    config: &BatchConfig,
    effective_parallel: usize,
    total_wait: Duration,
) -> BatchSummary {
    let total = outcomes.len().max(1);
    let completed = outcomes
        .iter()
        .filter(|o| o.status == GoalStatus::Completed)
        .count();
    let partial_failed = outcomes
        .iter()
        .filter(|o| o.status == GoalStatus::PartialFailed)
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| o.status == GoalStatus::Failed)
        .count();
    let total_rate_limit_signals: u32 = outcomes.iter().map(|o| o.rate_limit_signals).sum();
    let total_backoff_ms: u64 = outcomes.iter().map(|o| o.backoff_ms).sum();
    let avg_sub_specs = outcomes.iter().map(|o| o.sub_spec_count as f64).sum::<f64>() / total as f64;
    let avg_replan_cycles =
        outcomes.iter().map(|o| o.replan_cycles as f64).sum::<f64>() / total as f64;

    BatchSummary {
        batch_session,
        metrics: BatchMetrics {
            success_rate: completed as f64 / total as f64,
            completed,
            partial_failed,
            failed,
            avg_sub_specs,
            avg_replan_cycles,
            total_rate_limit_signals,
            avg_rate_limit_signals: total_rate_limit_signals as f64 / total as f64,
            total_backoff_ms,
        },
        resource_plan: ResourcePlan {
            configured_parallel: config.batch_parallel,
            configured_agent_budget: config.batch_agent_budget,
            effective_parallel,
            strategy: config.strategy,
            aging_factor: config.aging_factor,
            total_wait,
        },
        goal_outcomes: outcomes,
        batch_retry,
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;

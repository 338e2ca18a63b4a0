// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller (§4.9): a long-running queue drainer.
//!
//! A single live instance is enforced by an exclusive lock file at
//! startup, and the main body is a periodic reconcile loop — but the lock
//! is [`ac_storage::acquire_lease`]'s TTL-based file lease rather than an
//! `fs2` advisory OS lock, since the controller's "lease" must be
//! inspectable and takeover-eligible across process restarts, not just
//! exclusive within one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ac_core::{Clock, Goal, SessionId, SessionKind, SessionStatus};
use ac_storage::{acquire_lease, SessionArchive, StorageError};
use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::error::ControlError;
use crate::ids::next_session_id;

/// Parse a queue file: either one goal per non-empty, non-`#`-prefixed
/// line, or a single JSON array of strings.
pub fn parse_queue(content: &str) -> Result<Vec<String>, ControlError> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(trimmed)
            .map_err(|e| ControlError::Queue(format!("invalid JSON queue: {e}")));
    }
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Deterministic dedup signature for a broad goal: case-folded, whitespace-
/// collapsed text, hashed so near-identical queue entries collapse to the
/// same key.
pub fn goal_signature(goal_text: &str) -> String {
    let normalized: String = goal_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Outcome of running one goal through the Program Runner, as reported
/// back to the controller for done/failed archiving.
#[derive(Debug, Clone)]
pub struct ControllerGoalOutcome {
    pub goal_text: String,
    pub session_id: SessionId,
    pub passed: bool,
}

/// Drives one goal through a full program run. A port, for the same
/// reason `ac_engine::CloseLoopRunner` takes its phases as collaborators:
/// the controller's job is queue/lease/cycle bookkeeping, not running
/// programs itself.
#[async_trait]
pub trait ProgramRunnerPort: Send + Sync {
    async fn run_goal(
        &mut self,
        goal: Goal,
        session_id: SessionId,
    ) -> Result<ControllerGoalOutcome, ControlError>;
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub queue_path: PathBuf,
    pub lease_path: PathBuf,
    pub dequeue_limit: usize,
    pub dedup: bool,
    pub wait_on_empty: bool,
    pub poll_interval: Duration,
    pub max_cycles: Option<u32>,
    pub max_elapsed: Option<Duration>,
    pub stop_on_goal_failure: bool,
    pub lease_ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QueueDrainedNoWait,
    MaxCyclesReached,
    MaxElapsedReached,
    GoalFailureStop,
    LeaseBusy,
}

#[derive(Debug, Clone)]
pub struct ControllerResult {
    pub cycles_run: u32,
    pub done: Vec<ControllerGoalOutcome>,
    pub failed: Vec<ControllerGoalOutcome>,
    pub stop_reason: StopReason,
}

fn read_queue(path: &Path) -> Result<Vec<String>, ControlError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    parse_queue(&content)
}

fn write_queue(path: &Path, remaining: &[String]) -> Result<(), ControlError> {
    let body = remaining.join("\n");
    std::fs::write(path, body)?;
    Ok(())
}

/// Run the controller loop under `config`, dispatching each dequeued goal
/// to `runner`. `holder_id` identifies this process for the lease lock.
pub async fn run_controller<C: Clock, R: ProgramRunnerPort>(
    clock: &C,
    archive: &SessionArchive,
    runner: &mut R,
    config: ControllerConfig,
    holder_id: &str,
    resume_session: Option<SessionId>,
) -> Result<ControllerResult, ControlError> {
    let ttl_ms = config.lease_ttl.as_millis() as u64;
    let lease = match acquire_lease(&config.lease_path, holder_id, ttl_ms, clock) {
        Ok(lease) => lease,
        Err(StorageError::LeaseHeld { .. }) if resume_session.is_none() => {
            return Ok(ControllerResult {
                cycles_run: 0,
                done: Vec::new(),
                failed: Vec::new(),
                stop_reason: StopReason::LeaseBusy,
            });
        }
        Err(other) => return Err(other.into()),
    };

    let session_id = resume_session
        .unwrap_or_else(|| next_session_id(clock, 0));
    let now = || chrono::Utc::now();
    let mut envelope = archive.create(
        SessionKind::Controller,
        session_id,
        now(),
        json!({ "queue_path": config.queue_path.display().to_string() }),
    )?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut done = Vec::new();
    let mut failed = Vec::new();
    let mut cycles: u32 = 0;
    let start = Instant::now();
    let mut sequence: u64 = 0;
    let stop_reason;

    loop {
        if let Some(max_cycles) = config.max_cycles {
            if cycles >= max_cycles {
                stop_reason = StopReason::MaxCyclesReached;
                break;
            }
        }
        if let Some(max_elapsed) = config.max_elapsed {
            if start.elapsed() >= max_elapsed {
                stop_reason = StopReason::MaxElapsedReached;
                break;
            }
        }

        let mut goals = read_queue(&config.queue_path)?;
        if config.dedup {
            goals.retain(|g| seen.insert(goal_signature(g)));
        }

        let batch: Vec<String> = goals.iter().take(config.dequeue_limit).cloned().collect();
        let remaining: Vec<String> = goals.into_iter().skip(config.dequeue_limit).collect();
        write_queue(&config.queue_path, &remaining)?;

        if batch.is_empty() {
            if config.wait_on_empty {
                archive.append_event(
                    SessionKind::Controller,
                    &mut envelope,
                    ac_core::Event::new("poll_empty", now()),
                )?;
                tokio::time::sleep(config.poll_interval).await;
                cycles += 1;
                continue;
            }
            stop_reason = StopReason::QueueDrainedNoWait;
            break;
        }

        let mut goal_failed_this_cycle = false;
        for goal_text in batch {
            sequence += 1;
            let goal_session = next_session_id(clock, sequence);
            let outcome = runner
                .run_goal(
                    Goal {
                        text: goal_text,
                        id: None,
                    },
                    goal_session,
                )
                .await?;
            if outcome.passed {
                done.push(outcome);
            } else {
                goal_failed_this_cycle = true;
                failed.push(outcome);
            }
        }

        cycles += 1;
        archive.append_event(
            SessionKind::Controller,
            &mut envelope,
            ac_core::Event::new("cycle", now())
                .with_data("done", done.len() as i64)
                .with_data("failed", failed.len() as i64),
        )?;

        if config.stop_on_goal_failure && goal_failed_this_cycle {
            stop_reason = StopReason::GoalFailureStop;
            break;
        }
    }

    archive.finalize(
        SessionKind::Controller,
        &mut envelope,
        if failed.is_empty() {
            SessionStatus::Completed
        } else {
            SessionStatus::PartialFailed
        },
        json!({ "done": done.len(), "failed": failed.len(), "cycles": cycles }),
        now(),
    )?;

    lease.release()?;

    Ok(ControllerResult {
        cycles_run: cycles,
        done,
        failed,
        stop_reason,
    })
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

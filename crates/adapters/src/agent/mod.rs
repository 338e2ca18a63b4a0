// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AI adapter: the opaque subprocess interface the Agent Orchestrator
//! drives (§4.5, §9 "Duck-typed adapters → opaque subprocess interface").
//!
//! Rather than an interactive, pty-backed agent session kept alive across
//! turns and monitored by a background file-watcher on its own session
//! log, this adapter is a single run-to-completion subprocess invocation
//! per attempt: spawn once, pipe the prompt on stdin, capture
//! stdout/stderr, wait under a timeout, and classify the result. There is
//! no reconnect, no interactive-prompt handling, and no in-process
//! embedding.

mod claude;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use claude::ClaudeLikeAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCall, FakeAdapter};

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use ac_core::{AgentId, SpecId};

use crate::error::AdapterError;
use crate::signal::RateLimitSignal;

/// Everything an adapter needs to launch one sub-agent attempt against one
/// spec's workspace.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub agent_id: AgentId,
    pub spec_id: SpecId,
    pub workspace_path: PathBuf,
    pub prompt: String,
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
}

/// How the orchestrator should treat a completed attempt (§4.5: "its exit
/// code and stderr classify success/retryable-failure/rate-limited-failure/
/// fatal").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentExitClass {
    Success,
    RetryableFailure,
    RateLimited,
    Fatal,
}

/// Result of one completed subprocess attempt.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub exit_class: AgentExitClass,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub rate_limit_signal: Option<RateLimitSignal>,
}

impl AgentOutcome {
    /// Last `max_chars` characters of stdout, for the orchestrator's
    /// `stdoutExcerpt` field (§4.5).
    pub fn stdout_excerpt(&self, max_chars: usize) -> String {
        let trimmed = self.stdout.trim();
        if trimmed.chars().count() <= max_chars {
            trimmed.to_string()
        } else {
            trimmed.chars().rev().take(max_chars).collect::<Vec<_>>().into_iter().rev().collect()
        }
    }
}

/// Subprocess adapter for driving a sub-agent attempt.
#[async_trait]
pub trait AiAdapter: Send + Sync {
    async fn run(&self, request: &AgentRequest) -> Result<AgentOutcome, AdapterError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

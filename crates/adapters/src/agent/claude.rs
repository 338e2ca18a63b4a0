// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed AI adapter (§4.5: "each spec becomes a short-lived
//! sub-process invoked via a configurable adapter command").

use std::collections::HashSet;
use std::time::Instant;

use async_trait::async_trait;

use super::{AgentExitClass, AgentOutcome, AgentRequest, AiAdapter};
use crate::error::AdapterError;
use crate::signal;
use crate::subprocess::run_with_stdin_timeout;

/// Exit codes conventionally produced by a killed or interrupted child
/// (SIGINT, SIGTERM, SIGKILL) — treated as retryable rather than fatal,
/// since they indicate the process was cut off rather than that it
/// reasoned its way to failure.
fn default_retryable_exit_codes() -> HashSet<i32> {
    [130, 143, 137].into_iter().collect()
}

/// Drives the configured adapter command as a subprocess, once per
/// attempt: the spec's workspace is the working directory, the prompt is
/// delivered on stdin, and stdout/stderr are captured and classified.
pub struct ClaudeLikeAdapter {
    adapter_command: String,
    adapter_args: Vec<String>,
    api_key_env_var: Option<String>,
    retryable_exit_codes: HashSet<i32>,
}

impl ClaudeLikeAdapter {
    pub fn new(adapter_command: impl Into<String>, adapter_args: Vec<String>) -> Self {
        Self {
            adapter_command: adapter_command.into(),
            adapter_args,
            api_key_env_var: None,
            retryable_exit_codes: default_retryable_exit_codes(),
        }
    }

    pub fn with_api_key_env_var(mut self, var: impl Into<String>) -> Self {
        self.api_key_env_var = Some(var.into());
        self
    }

    pub fn with_retryable_exit_codes(mut self, codes: HashSet<i32>) -> Self {
        self.retryable_exit_codes = codes;
        self
    }

    fn classify_exit(
        &self,
        success: bool,
        exit_code: Option<i32>,
        rate_limit_signal: Option<signal::RateLimitSignal>,
    ) -> AgentExitClass {
        if success {
            return AgentExitClass::Success;
        }
        if rate_limit_signal.is_some() {
            return AgentExitClass::RateLimited;
        }
        match exit_code {
            None => AgentExitClass::RetryableFailure,
            Some(code) if self.retryable_exit_codes.contains(&code) => {
                AgentExitClass::RetryableFailure
            }
            Some(_) => AgentExitClass::Fatal,
        }
    }
}

#[async_trait]
impl AiAdapter for ClaudeLikeAdapter {
    async fn run(&self, request: &AgentRequest) -> Result<AgentOutcome, AdapterError> {
        let mut cmd = tokio::process::Command::new(&self.adapter_command);
        cmd.args(&self.adapter_args);
        cmd.current_dir(&request.workspace_path);
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        if let Some(var) = &self.api_key_env_var {
            if std::env::var_os(var).is_none() {
                tracing::warn!(env_var = %var, "adapter api key env var not set in parent process");
            }
        }

        let description = format!("adapter run for spec {}", request.spec_id);
        let started = Instant::now();
        let output = run_with_stdin_timeout(
            cmd,
            &request.prompt,
            request.timeout,
            &description,
        )
        .await
        .map_err(|message| {
            if message.contains("timed out") {
                AdapterError::Timeout {
                    description: description.clone(),
                    timeout_secs: request.timeout.as_secs(),
                }
            } else if message.contains("failed to start") {
                AdapterError::Spawn {
                    description: description.clone(),
                    source: std::io::Error::other(message),
                }
            } else {
                AdapterError::Io {
                    description: description.clone(),
                    source: std::io::Error::other(message),
                }
            }
        })?;
        let elapsed = started.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let rate_limit_signal = signal::classify(&stdout, &stderr);
        let exit_code = output.status.code();
        let exit_class = self.classify_exit(output.status.success(), exit_code, rate_limit_signal);

        tracing::info!(
            spec_id = %request.spec_id,
            agent_id = %request.agent_id,
            exit_code = ?exit_code,
            elapsed_ms = elapsed.as_millis() as u64,
            exit_class = ?exit_class,
            "adapter subprocess completed"
        );

        Ok(AgentOutcome {
            exit_class,
            exit_code,
            stdout,
            stderr,
            elapsed,
            rate_limit_signal,
        })
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests gate (§4.6 GATE): run one configured shell command under a
//! timeout and report pass/fail from its exit code.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::ShellError;

const EXCERPT_LEN: usize = 4096;

/// Outcome of running the tests-gate command once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub passed: bool,
    pub exit_code: Option<i32>,
    pub stdout_excerpt: String,
    pub stderr_excerpt: String,
}

fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= EXCERPT_LEN {
        text.into_owned()
    } else {
        text[..EXCERPT_LEN].to_string()
    }
}

/// Run `command` through `sh -c` in `cwd`, killing it if it runs past
/// `timeout`. The gate passes when the process exits with status 0.
pub async fn run_test_gate(
    command: &str,
    cwd: &Path,
    timeout: Duration,
) -> Result<GateOutcome, ShellError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(cwd);
    cmd.kill_on_drop(true);

    info!(command, timeout_secs = timeout.as_secs(), "running tests gate");

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => return Err(ShellError::Spawn(source)),
        Err(_elapsed) => {
            warn!(command, "tests gate timed out");
            return Err(ShellError::Timeout {
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    let passed = output.status.success();
    if !passed {
        warn!(command, code = ?output.status.code(), "tests gate failed");
    }

    Ok(GateOutcome {
        passed,
        exit_code: output.status.code(),
        stdout_excerpt: excerpt(&output.stdout),
        stderr_excerpt: excerpt(&output.stderr),
    })
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers.

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Run a subprocess command with a timeout, writing `stdin_data` to the
/// child's stdin before waiting on it. Used by the AI adapter, whose
/// contract is to deliver the prompt over stdin rather than as an argv
/// entry.
pub async fn run_with_stdin_timeout(
    mut cmd: Command,
    stdin_data: &str,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|io_err| format!("{} failed to start: {}", description, io_err))?;

    #[allow(clippy::expect_used)]
    let mut stdin = child
        .stdin
        .take()
        .expect("stdin was requested as piped");
    let stdin_data = stdin_data.to_string();
    let write_result = stdin.write_all(stdin_data.as_bytes()).await;
    drop(stdin);
    if let Err(io_err) = write_result {
        let _ = child.kill().await;
        return Err(format!("{} failed to write stdin: {}", description, io_err));
    }

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;

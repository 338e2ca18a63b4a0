use super::*;
use ac_core::{AgentId, SpecId};
use std::time::Duration;
use tempfile::tempdir;

fn request(prompt: &str, timeout: Duration) -> AgentRequest {
    AgentRequest {
        agent_id: AgentId::new("agent-1"),
        spec_id: SpecId::from("01-01-widget-catalog-api"),
        workspace_path: tempdir().unwrap().into_path(),
        prompt: prompt.to_string(),
        env: Vec::new(),
        timeout,
    }
}

#[tokio::test]
async fn run_reports_success_and_echoes_stdin_to_stdout() {
    let adapter = ClaudeLikeAdapter::new("cat", Vec::new());
    let outcome = adapter
        .run(&request("do the thing", Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(outcome.exit_class, AgentExitClass::Success);
    assert_eq!(outcome.stdout, "do the thing");
    assert!(outcome.rate_limit_signal.is_none());
}

#[tokio::test]
async fn run_classifies_nonzero_exit_as_fatal_by_default() {
    let adapter = ClaudeLikeAdapter::new("sh", vec!["-c".to_string(), "exit 1".to_string()]);
    let outcome = adapter
        .run(&request("", Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(outcome.exit_class, AgentExitClass::Fatal);
    assert_eq!(outcome.exit_code, Some(1));
}

#[tokio::test]
async fn run_classifies_configured_retryable_exit_code() {
    let adapter = ClaudeLikeAdapter::new("sh", vec!["-c".to_string(), "exit 75".to_string()])
        .with_retryable_exit_codes([75].into_iter().collect());
    let outcome = adapter
        .run(&request("", Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(outcome.exit_class, AgentExitClass::RetryableFailure);
}

#[tokio::test]
async fn run_classifies_rate_limit_signal_from_stderr_even_on_nonzero_exit() {
    let adapter = ClaudeLikeAdapter::new(
        "sh",
        vec![
            "-c".to_string(),
            "echo '429 too many requests' 1>&2; exit 1".to_string(),
        ],
    );
    let outcome = adapter
        .run(&request("", Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(outcome.exit_class, AgentExitClass::RateLimited);
    assert!(outcome.rate_limit_signal.is_some());
}

#[tokio::test]
async fn run_times_out_and_reports_timeout_error() {
    let adapter = ClaudeLikeAdapter::new("sleep", vec!["10".to_string()]);
    let result = adapter
        .run(&request("", Duration::from_millis(100)))
        .await;
    assert!(matches!(result, Err(AdapterError::Timeout { .. })));
}

#[tokio::test]
async fn run_reports_spawn_error_for_missing_binary() {
    let adapter = ClaudeLikeAdapter::new("/nonexistent/binary", Vec::new());
    let result = adapter.run(&request("", Duration::from_secs(5))).await;
    assert!(matches!(result, Err(AdapterError::Spawn { .. })));
}

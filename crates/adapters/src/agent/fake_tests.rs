use super::*;
use crate::agent::{AgentExitClass, AgentRequest};
use ac_core::{AgentId, SpecId};
use std::time::Duration;

fn request() -> AgentRequest {
    AgentRequest {
        agent_id: AgentId::new("agent-1"),
        spec_id: SpecId::from("01-01-widget-catalog-api"),
        workspace_path: std::env::temp_dir(),
        prompt: "build the thing".to_string(),
        env: Vec::new(),
        timeout: Duration::from_secs(60),
    }
}

fn success_outcome() -> AgentOutcome {
    AgentOutcome {
        exit_class: AgentExitClass::Success,
        exit_code: Some(0),
        stdout: "ok".to_string(),
        stderr: String::new(),
        elapsed: Duration::from_secs(1),
        rate_limit_signal: None,
    }
}

#[tokio::test]
async fn run_records_every_call() {
    let adapter = FakeAdapter::new();
    adapter.set_default_outcome(success_outcome());
    adapter.run(&request()).await.unwrap();
    adapter.run(&request()).await.unwrap();

    assert_eq!(adapter.call_count(), 2);
    assert_eq!(adapter.calls()[0].prompt, "build the thing");
}

#[tokio::test]
async fn run_consumes_scripted_outcomes_in_order() {
    let adapter = FakeAdapter::new();
    let mut first = success_outcome();
    first.stdout = "first".to_string();
    let mut second = success_outcome();
    second.stdout = "second".to_string();
    adapter.push_outcome(first);
    adapter.push_outcome(second);

    let a = adapter.run(&request()).await.unwrap();
    let b = adapter.run(&request()).await.unwrap();
    assert_eq!(a.stdout, "first");
    assert_eq!(b.stdout, "second");
}

#[tokio::test]
async fn run_falls_back_to_default_after_scripted_queue_drains() {
    let adapter = FakeAdapter::new();
    adapter.push_outcome(success_outcome());
    adapter.set_default_outcome(success_outcome());

    adapter.run(&request()).await.unwrap();
    let fallback = adapter.run(&request()).await.unwrap();
    assert_eq!(fallback.exit_class, AgentExitClass::Success);
}

#[tokio::test]
async fn run_without_any_script_or_default_errors() {
    let adapter = FakeAdapter::new();
    let result = adapter.run(&request()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn push_timeout_surfaces_timeout_error() {
    let adapter = FakeAdapter::new();
    adapter.push_timeout();
    let result = adapter.run(&request()).await;
    assert!(matches!(result, Err(AdapterError::Timeout { .. })));
}

#[tokio::test]
async fn push_spawn_error_surfaces_spawn_error() {
    let adapter = FakeAdapter::new();
    adapter.push_spawn_error();
    let result = adapter.run(&request()).await;
    assert!(matches!(result, Err(AdapterError::Spawn { .. })));
}

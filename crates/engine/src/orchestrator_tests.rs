use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ac_adapters::{AgentExitClass, AgentOutcome, FakeAdapter, RateLimitSignal};
use ac_core::{Dependency, DependencyType, SystemClock};

use super::*;
use crate::governor::NoJitter;

fn task(spec_id: &str, dependencies: Vec<Dependency>) -> SpecTask {
    SpecTask {
        spec_id: SpecId::from(spec_id),
        workspace_path: PathBuf::from("/tmp/workspace"),
        prompt: format!("implement {spec_id}"),
        env: Vec::new(),
        dependencies,
        criticality: 0,
    }
}

fn outcome(exit_class: AgentExitClass, rate_limit_signal: Option<RateLimitSignal>) -> AgentOutcome {
    AgentOutcome {
        exit_class,
        exit_code: Some(0),
        stdout: "done".to_string(),
        stderr: String::new(),
        elapsed: Duration::from_millis(10),
        rate_limit_signal,
    }
}

fn config(max_retries: u32, profile: RateLimitProfile) -> OrchestratorConfig {
    OrchestratorConfig {
        max_parallel: 4,
        agent_budget: 4,
        timeout: Duration::from_secs(30),
        max_retries,
        rate_limit_profile: profile,
    }
}

#[tokio::test]
async fn orchestrate_succeeds_independent_ready_specs_in_parallel() {
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(outcome(AgentExitClass::Success, None));
    let mut orch = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter.clone(),
        config(3, RateLimitProfile::Balanced),
        NoJitter,
    );

    let tasks = vec![task("01-01-a", vec![]), task("01-02-b", vec![])];
    let summary = orch.orchestrate(tasks, &HashSet::new()).await;

    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.failure_count, 0);
    assert_eq!(adapter.call_count(), 2);
}

#[tokio::test]
async fn orchestrate_withholds_a_spec_until_its_completion_dependency_is_satisfied() {
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(outcome(AgentExitClass::Success, None));
    let mut orch = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter.clone(),
        config(3, RateLimitProfile::Balanced),
        NoJitter,
    );

    let dep = Dependency {
        spec: SpecId::from("01-01-a"),
        kind: DependencyType::RequiresCompletion,
        reason: "b consumes a's interface".to_string(),
    };
    let tasks = vec![task("01-01-a", vec![]), task("01-02-b", vec![dep])];
    let summary = orch.orchestrate(tasks, &HashSet::new()).await;

    assert_eq!(summary.success_count, 2);
    let calls = adapter.calls();
    let a_index = calls.iter().position(|c| c.spec_id == "01-01-a").unwrap();
    let b_index = calls.iter().position(|c| c.spec_id == "01-02-b").unwrap();
    assert!(a_index < b_index, "dependency spec must launch before its dependent");
}

#[tokio::test]
async fn orchestrate_treats_an_already_completed_dependency_as_satisfied() {
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(outcome(AgentExitClass::Success, None));
    let mut orch = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter.clone(),
        config(3, RateLimitProfile::Balanced),
        NoJitter,
    );

    let dep = Dependency {
        spec: SpecId::from("00-00-prior-cycle"),
        kind: DependencyType::RequiresCompletion,
        reason: "carried over from an earlier orchestration cycle".to_string(),
    };
    let mut already_completed = HashSet::new();
    already_completed.insert(SpecId::from("00-00-prior-cycle"));

    let summary = orch
        .orchestrate(vec![task("01-01-b", vec![dep])], &already_completed)
        .await;

    assert_eq!(summary.success_count, 1);
}

#[tokio::test]
async fn orchestrate_fails_a_spec_whose_dependency_never_arrives() {
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(outcome(AgentExitClass::Success, None));
    let mut orch = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter.clone(),
        config(3, RateLimitProfile::Balanced),
        NoJitter,
    );

    let dep = Dependency {
        spec: SpecId::from("99-99-missing"),
        kind: DependencyType::RequiresCompletion,
        reason: "never scheduled and never in already_completed".to_string(),
    };
    let summary = orch
        .orchestrate(vec![task("01-01-b", vec![dep])], &HashSet::new())
        .await;

    assert_eq!(summary.failure_count, 1);
    assert_eq!(adapter.call_count(), 0);
}

#[tokio::test]
async fn orchestrate_retries_retryable_failures_up_to_max_retries_then_fails() {
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(outcome(AgentExitClass::RetryableFailure, None));
    let mut orch = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter.clone(),
        config(3, RateLimitProfile::Balanced),
        NoJitter,
    );

    let summary = orch
        .orchestrate(vec![task("01-01-a", vec![])], &HashSet::new())
        .await;

    assert_eq!(summary.failure_count, 1);
    assert_eq!(summary.outcomes[0].attempts, 3);
    assert_eq!(adapter.call_count(), 3);
}

#[tokio::test]
async fn orchestrate_fails_immediately_on_a_fatal_exit_class() {
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(outcome(AgentExitClass::Fatal, None));
    let mut orch = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter.clone(),
        config(5, RateLimitProfile::Balanced),
        NoJitter,
    );

    let summary = orch
        .orchestrate(vec![task("01-01-a", vec![])], &HashSet::new())
        .await;

    assert_eq!(summary.failure_count, 1);
    assert_eq!(summary.outcomes[0].attempts, 1);
}

#[tokio::test]
async fn orchestrate_waits_out_a_rate_limit_backoff_then_recovers() {
    let adapter = Arc::new(FakeAdapter::new());
    adapter.push_outcome(outcome(
        AgentExitClass::RateLimited,
        Some(RateLimitSignal { retry_after: None }),
    ));
    adapter.set_default_outcome(outcome(AgentExitClass::Success, None));
    let mut orch = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter.clone(),
        config(5, RateLimitProfile::Aggressive),
        NoJitter,
    );

    let summary = orch
        .orchestrate(vec![task("01-01-a", vec![])], &HashSet::new())
        .await;

    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.outcomes[0].attempts, 2);
    assert_eq!(summary.total_rate_limit_signals, 1);
    assert!(summary.total_backoff_ms > 0);
}

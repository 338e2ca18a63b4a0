use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ac_adapters::{AgentExitClass, AgentOutcome, FakeAdapter};
use ac_core::{Goal, SessionId, SystemClock};
use tempfile::tempdir;

use super::*;
use crate::governor::{NoJitter, RateLimitProfile};
use crate::orchestrator::{AgentOrchestrator, OrchestratorConfig, SpecTask};

struct FixedDecomposer;

impl GoalDecomposer for FixedDecomposer {
    fn decompose(&self, _goal: &Goal, _sub_override: Option<u8>) -> Result<DecomposePlan, EngineError> {
        Ok(DecomposePlan {
            master_spec: SpecId::from("00-00-goal"),
            sub_specs: vec![SpecId::from("01-01-a"), SpecId::from("01-02-b")],
        })
    }
}

struct FixedBootstrapper;

fn bootstrap_tasks(plan: &DecomposePlan) -> Vec<SpecTask> {
    plan.sub_specs
        .iter()
        .map(|spec_id| SpecTask {
            spec_id: spec_id.clone(),
            workspace_path: PathBuf::from("/tmp/workspace"),
            prompt: format!("implement {spec_id}"),
            env: Vec::new(),
            dependencies: Vec::new(),
            criticality: 0,
        })
        .collect()
}

impl SpecBootstrapper for FixedBootstrapper {
    fn bootstrap(&self, plan: &DecomposePlan) -> Result<Vec<SpecTask>, EngineError> {
        Ok(bootstrap_tasks(plan))
    }

    fn replan(
        &self,
        plan: &DecomposePlan,
        _prior: &OrchestrationSummary,
    ) -> Result<Vec<SpecTask>, EngineError> {
        Ok(bootstrap_tasks(plan))
    }
}

struct PassWhenNoFailures;

impl GateEvaluator for PassWhenNoFailures {
    fn evaluate(&self, summary: &OrchestrationSummary) -> GateVerdict {
        if summary.failure_count == 0 {
            GateVerdict::Pass
        } else {
            GateVerdict::Failed(vec!["orchestration had failures".to_string()])
        }
    }
}

fn success_outcome() -> AgentOutcome {
    AgentOutcome {
        exit_class: AgentExitClass::Success,
        exit_code: Some(0),
        stdout: "ok".to_string(),
        stderr: String::new(),
        elapsed: Duration::from_millis(5),
        rate_limit_signal: None,
    }
}

fn fatal_outcome() -> AgentOutcome {
    AgentOutcome {
        exit_class: AgentExitClass::Fatal,
        exit_code: Some(1),
        stdout: String::new(),
        stderr: "unrecoverable".to_string(),
        elapsed: Duration::from_millis(5),
        rate_limit_signal: None,
    }
}

fn orchestrator_config() -> OrchestratorConfig {
    OrchestratorConfig {
        max_parallel: 4,
        agent_budget: 4,
        timeout: Duration::from_secs(30),
        max_retries: 1,
        rate_limit_profile: RateLimitProfile::Balanced,
    }
}

#[tokio::test]
async fn close_loop_completes_when_the_gate_passes_on_the_first_cycle() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(success_outcome());
    let mut orchestrator = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter,
        orchestrator_config(),
        NoJitter,
    );

    let mut runner = CloseLoopRunner::new(
        SystemClock,
        SessionArchive::new(dir.path()),
        FixedDecomposer,
        FixedBootstrapper,
        PassWhenNoFailures,
        ReplanStrategy::default(),
    );

    let result = runner
        .run(
            Goal {
                text: "ship the widget catalog".to_string(),
                id: None,
            },
            SessionId::from("0-20260727000000"),
            None,
            &mut orchestrator,
            ResumeMode::Fresh,
            serde_json::Value::Null,
        )
        .await
        .unwrap();

    assert_eq!(result.status, SessionStatus::Completed);
    assert_eq!(result.cycles, 0);
}

#[tokio::test]
async fn close_loop_fails_without_replanning_when_the_budget_is_zero() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(fatal_outcome());
    let mut orchestrator = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter,
        orchestrator_config(),
        NoJitter,
    );

    let mut runner = CloseLoopRunner::new(
        SystemClock,
        SessionArchive::new(dir.path()),
        FixedDecomposer,
        FixedBootstrapper,
        PassWhenNoFailures,
        ReplanStrategy::Fixed { replan_attempts: 0 },
    );

    let result = runner
        .run(
            Goal {
                text: "ship the widget catalog".to_string(),
                id: None,
            },
            SessionId::from("0-20260727000001"),
            None,
            &mut orchestrator,
            ResumeMode::Fresh,
            serde_json::Value::Null,
        )
        .await
        .unwrap();

    assert_eq!(result.status, SessionStatus::Failed);
    assert_eq!(result.cycles, 1);
}

#[tokio::test]
async fn close_loop_stops_replanning_after_the_no_progress_window_is_exhausted() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(fatal_outcome());
    let mut orchestrator = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter,
        orchestrator_config(),
        NoJitter,
    );

    let mut runner = CloseLoopRunner::new(
        SystemClock,
        SessionArchive::new(dir.path()),
        FixedDecomposer,
        FixedBootstrapper,
        PassWhenNoFailures,
        ReplanStrategy::Adaptive {
            replan_attempts: 5,
            no_progress_window: 1,
        },
    );

    let result = runner
        .run(
            Goal {
                text: "ship the widget catalog".to_string(),
                id: None,
            },
            SessionId::from("0-20260727000002"),
            None,
            &mut orchestrator,
            ResumeMode::Fresh,
            serde_json::Value::Null,
        )
        .await
        .unwrap();

    // First cycle always counts as progress (no prior baseline); the
    // second cycle repeats the same zero-success result, exhausting a
    // no-progress window of 1.
    assert_eq!(result.status, SessionStatus::Failed);
    assert_eq!(result.cycles, 2);
}

#[tokio::test]
async fn close_loop_persists_a_session_snapshot_that_can_be_loaded_back() {
    let dir = tempdir().unwrap();
    let archive = SessionArchive::new(dir.path());
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(success_outcome());
    let mut orchestrator = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter,
        orchestrator_config(),
        NoJitter,
    );

    let session_id = SessionId::from("0-20260727000003");
    let mut runner = CloseLoopRunner::new(
        SystemClock,
        SessionArchive::new(dir.path()),
        FixedDecomposer,
        FixedBootstrapper,
        PassWhenNoFailures,
        ReplanStrategy::default(),
    );

    runner
        .run(
            Goal {
                text: "ship the widget catalog".to_string(),
                id: None,
            },
            session_id.clone(),
            None,
            &mut orchestrator,
            ResumeMode::Fresh,
            serde_json::Value::Null,
        )
        .await
        .unwrap();

    let loaded = archive
        .load(SessionKind::CloseLoop, &session_id)
        .unwrap()
        .expect("session snapshot should have been persisted");
    assert_eq!(loaded.status, SessionStatus::Completed);
    assert!(loaded.events.iter().any(|e| e.kind == "decompose"));
    assert!(loaded.events.iter().any(|e| e.kind == "orchestrate"));
}

#[tokio::test]
async fn resuming_a_completed_session_is_a_no_op() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(success_outcome());
    let mut orchestrator =
        AgentOrchestrator::with_jitter(SystemClock, adapter.clone(), orchestrator_config(), NoJitter);

    let session_id = SessionId::from("0-20260727000004");
    let mut runner = CloseLoopRunner::new(
        SystemClock,
        SessionArchive::new(dir.path()),
        FixedDecomposer,
        FixedBootstrapper,
        PassWhenNoFailures,
        ReplanStrategy::default(),
    );

    let goal = Goal {
        text: "ship the widget catalog".to_string(),
        id: None,
    };

    runner
        .run(
            goal.clone(),
            session_id.clone(),
            None,
            &mut orchestrator,
            ResumeMode::Fresh,
            serde_json::json!({ "min_success_rate": 0.8 }),
        )
        .await
        .unwrap();

    let calls_before_resume = adapter.call_count();

    let result = runner
        .run(
            goal,
            session_id,
            None,
            &mut orchestrator,
            ResumeMode::Resume { allow_drift: false },
            serde_json::json!({ "min_success_rate": 0.8 }),
        )
        .await
        .unwrap();

    assert_eq!(result.status, SessionStatus::Completed);
    assert_eq!(
        adapter.call_count(),
        calls_before_resume,
        "resuming a completed session must not launch any new agent attempts"
    );
}

#[tokio::test]
async fn resuming_with_a_different_policy_is_refused_without_allow_drift() {
    let dir = tempdir().unwrap();
    let adapter = Arc::new(FakeAdapter::new());
    adapter.set_default_outcome(success_outcome());
    let mut orchestrator = AgentOrchestrator::with_jitter(
        SystemClock,
        adapter,
        orchestrator_config(),
        NoJitter,
    );

    let session_id = SessionId::from("0-20260727000005");
    let test_archive = SessionArchive::new(dir.path());

    // Simulate a process that crashed right after `create`, having
    // recorded one event but never reaching a finalize call: the session
    // is still `Running`, the only state a genuine resume can continue.
    let mut seed_envelope = test_archive
        .create(
            SessionKind::CloseLoop,
            session_id.clone(),
            chrono::Utc::now(),
            serde_json::json!({ "goal": "ship the widget catalog" }),
        )
        .unwrap();
    seed_envelope.policy = serde_json::json!({ "min_success_rate": 0.8 });
    test_archive
        .append_event(
            SessionKind::CloseLoop,
            &mut seed_envelope,
            Event::new("decompose", chrono::Utc::now()),
        )
        .unwrap();

    let mut runner = CloseLoopRunner::new(
        SystemClock,
        SessionArchive::new(dir.path()),
        FixedDecomposer,
        FixedBootstrapper,
        PassWhenNoFailures,
        ReplanStrategy::default(),
    );

    let goal = Goal {
        text: "ship the widget catalog".to_string(),
        id: None,
    };

    let result = runner
        .run(
            goal,
            session_id,
            None,
            &mut orchestrator,
            ResumeMode::Resume { allow_drift: false },
            serde_json::json!({ "min_success_rate": 0.5 }),
        )
        .await;

    assert!(matches!(result, Err(EngineError::PolicyDrift(_))));
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use ac_core::Goal;
use async_trait::async_trait;

use super::*;

struct ScriptedRunner {
    /// goal text -> outcomes to return on successive calls (last one repeats)
    scripts: HashMap<String, Vec<GoalRunOutcome>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedRunner {
    fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn script(mut self, goal_text: &str, outcomes: Vec<GoalRunOutcome>) -> Self {
        self.scripts.insert(goal_text.to_string(), outcomes);
        self
    }
}

#[async_trait]
impl GoalRunner for ScriptedRunner {
    async fn run_goal(
        &self,
        goal: Goal,
        session_id: SessionId,
    ) -> Result<GoalRunOutcome, ControlError> {
        let script = self
            .scripts
            .get(&goal.text)
            .expect("scripted goal should have a registered outcome");
        let index = {
            let mut calls = self.calls.lock().expect("scripted runner call lock poisoned");
            let call = calls.entry(goal.text.clone()).or_insert(0);
            let index = (*call).min(script.len() - 1);
            *call += 1;
            index
        };
        let mut outcome = script[index].clone();
        outcome.session_id = session_id;
        Ok(outcome)
    }
}

fn outcome(status: GoalStatus, rate_limit_signals: u32) -> GoalRunOutcome {
    GoalRunOutcome {
        goal_text: String::new(),
        session_id: SessionId::new("placeholder"),
        status,
        sub_spec_count: 3,
        replan_cycles: 0,
        rate_limit_signals,
        backoff_ms: 0,
        elapsed: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn batch_runs_every_goal_and_reports_a_completed_summary() {
    let runner = ScriptedRunner::new()
        .script("build widget catalog", vec![outcome(GoalStatus::Completed, 0)])
        .script("ship invoicing", vec![outcome(GoalStatus::Completed, 0)]);

    let goals = vec![
        Goal { text: "build widget catalog".to_string(), id: None },
        Goal { text: "ship invoicing".to_string(), id: None },
    ];

    let summary = run_batch(
        runner,
        goals,
        BatchConfig::default(),
        SessionId::new("batch-1"),
    )
    .await
    .unwrap();

    assert_eq!(summary.goal_outcomes.len(), 2);
    assert_eq!(summary.metrics.completed, 2);
    assert_eq!(summary.metrics.success_rate, 1.0);
}

#[tokio::test]
async fn continue_on_error_keeps_running_the_remaining_goals_after_a_failure() {
    let runner = ScriptedRunner::new()
        .script("a", vec![outcome(GoalStatus::Failed, 0)])
        .script("b", vec![outcome(GoalStatus::Completed, 0)]);

    let goals = vec![
        Goal { text: "a".to_string(), id: None },
        Goal { text: "b".to_string(), id: None },
    ];

    let mut config = BatchConfig::default();
    config.continue_on_error = true;
    config.batch_parallel = 1;
    config.batch_agent_budget = 1;

    let summary = run_batch(runner, goals, config, SessionId::new("batch-2"))
        .await
        .unwrap();

    assert_eq!(summary.goal_outcomes.len(), 2);
    assert_eq!(summary.metrics.completed, 1);
    assert_eq!(summary.metrics.failed, 1);
}

#[tokio::test]
async fn until_complete_retry_keeps_requeuing_until_the_goal_succeeds() {
    let runner = ScriptedRunner::new().script(
        "flaky",
        vec![
            outcome(GoalStatus::Failed, 0),
            outcome(GoalStatus::Completed, 0),
        ],
    );

    let mut config = BatchConfig::default();
    config.retry_mode = RetryMode::UntilComplete;
    config.batch_retry_max_rounds = 5;

    let summary = run_batch(
        runner,
        vec![Goal { text: "flaky".to_string(), id: None }],
        config,
        SessionId::new("batch-3"),
    )
    .await
    .unwrap();

    assert_eq!(summary.batch_retry.len(), 2);
    assert_eq!(summary.goal_outcomes.last().unwrap().status, GoalStatus::Completed);
}

#[tokio::test]
async fn adaptive_retry_halves_the_effective_parallel_cap_under_sustained_pressure() {
    let runner = ScriptedRunner::new().script(
        "rate-limited",
        vec![
            outcome(GoalStatus::Failed, 5),
            outcome(GoalStatus::Completed, 0),
        ],
    );

    let mut config = BatchConfig::default();
    config.retry_mode = RetryMode::Adaptive;
    config.batch_parallel = 8;
    config.batch_agent_budget = 8;
    config.sustained_pressure_threshold = 3;
    config.batch_retry_max_rounds = 3;

    let summary = run_batch(
        runner,
        vec![Goal { text: "rate-limited".to_string(), id: None }],
        config,
        SessionId::new("batch-4"),
    )
    .await
    .unwrap();

    assert!(summary.batch_retry[0].halved_budget);
    assert_eq!(summary.resource_plan.effective_parallel, 4);
}

use ac_core::{Goal, SessionId};
use async_trait::async_trait;

use super::*;
use crate::batch::{BatchConfig, GoalRunOutcome, GoalRunner, GoalStatus};

struct AlwaysCompletes;

#[async_trait]
impl GoalRunner for AlwaysCompletes {
    async fn run_goal(
        &self,
        goal: Goal,
        session_id: SessionId,
    ) -> Result<GoalRunOutcome, ControlError> {
        Ok(GoalRunOutcome {
            goal_text: goal.text,
            session_id,
            status: GoalStatus::Completed,
            sub_spec_count: 3,
            replan_cycles: 0,
            rate_limit_signals: 0,
            backoff_ms: 0,
            elapsed: std::time::Duration::from_millis(5),
        })
    }
}

#[test]
fn decomposition_splits_on_clause_boundaries() {
    let goal = Goal {
        text: "build the catalog service, add the checkout flow and ship the admin dashboard"
            .to_string(),
        id: None,
    };
    let decomposition = decompose_program_goal(&goal, 0.3);
    assert!(decomposition.goals.len() >= 2);
    assert!(decomposition.quality_score > 0.0);
}

#[test]
fn low_quality_split_triggers_refinement() {
    let goal = Goal {
        text: "a, b, polish the entire release pipeline end to end".to_string(),
        id: None,
    };
    let decomposition = decompose_program_goal(&goal, 0.99);
    assert!(decomposition.refined);
}

#[test]
fn program_gate_passes_on_fallback_profile_when_primary_fails() {
    let summary = crate::batch::BatchSummary {
        batch_session: SessionId::new("s"),
        goal_outcomes: Vec::new(),
        resource_plan: crate::batch::ResourcePlan {
            configured_parallel: 4,
            configured_agent_budget: 8,
            effective_parallel: 4,
            strategy: crate::batch::ScheduleStrategy::ComplexFirst,
            aging_factor: 1.0,
            total_wait: std::time::Duration::from_secs(10),
        },
        metrics: crate::batch::BatchMetrics {
            success_rate: 0.6,
            completed: 3,
            partial_failed: 0,
            failed: 2,
            avg_sub_specs: 3.0,
            avg_replan_cycles: 0.0,
            total_rate_limit_signals: 0,
            avg_rate_limit_signals: 0.0,
            total_backoff_ms: 0,
        },
        batch_retry: Vec::new(),
    };

    let verdict = evaluate_program_gate(
        &summary,
        RiskLevel::Medium,
        GateProfile::Prod,
        &[GateProfile::Dev],
    );

    assert!(verdict.passed);
    assert!(verdict.passed_on_fallback);
    assert_eq!(verdict.profile_used, GateProfile::Dev);
}

#[tokio::test]
async fn run_program_produces_no_remediation_when_the_gate_passes() {
    let runner = AlwaysCompletes;
    let config = ProgramConfig {
        batch: BatchConfig::default(),
        min_decomposition_quality: 0.2,
        primary_profile: GateProfile::Dev,
        fallback_chain: Vec::new(),
        sub_override: None,
    };

    let result = run_program(
        runner,
        Goal {
            text: "ship the widget catalog and notify the team".to_string(),
            id: None,
        },
        config,
        SessionId::new("program-1"),
        RiskLevel::Low,
    )
    .await
    .unwrap();

    assert!(result.gate_verdict.passed);
    assert!(result.remediation.is_empty());
}

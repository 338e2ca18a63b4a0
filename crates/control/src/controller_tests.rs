use ac_core::FakeClock;
use async_trait::async_trait;
use tempfile::tempdir;

use super::*;

struct AlwaysPasses;

#[async_trait]
impl ProgramRunnerPort for AlwaysPasses {
    async fn run_goal(
        &mut self,
        goal: Goal,
        session_id: SessionId,
    ) -> Result<ControllerGoalOutcome, ControlError> {
        Ok(ControllerGoalOutcome {
            goal_text: goal.text,
            session_id,
            passed: true,
        })
    }
}

struct FailsOnKeyword(&'static str);

#[async_trait]
impl ProgramRunnerPort for FailsOnKeyword {
    async fn run_goal(
        &mut self,
        goal: Goal,
        session_id: SessionId,
    ) -> Result<ControllerGoalOutcome, ControlError> {
        let passed = !goal.text.contains(self.0);
        Ok(ControllerGoalOutcome {
            goal_text: goal.text,
            session_id,
            passed,
        })
    }
}

fn config(dir: &std::path::Path) -> ControllerConfig {
    ControllerConfig {
        queue_path: dir.join("queue.txt"),
        lease_path: dir.join("controller.lease.json"),
        dequeue_limit: 10,
        dedup: true,
        wait_on_empty: false,
        poll_interval: Duration::from_millis(5),
        max_cycles: Some(10),
        max_elapsed: None,
        stop_on_goal_failure: false,
        lease_ttl: Duration::from_secs(60),
    }
}

#[test]
fn parse_queue_reads_newline_separated_goals_and_skips_comments() {
    let goals = parse_queue("build widget\n# a comment\n\nship invoicing\n").unwrap();
    assert_eq!(goals, vec!["build widget", "ship invoicing"]);
}

#[test]
fn parse_queue_reads_a_json_array() {
    let goals = parse_queue(r#"["build widget", "ship invoicing"]"#).unwrap();
    assert_eq!(goals, vec!["build widget", "ship invoicing"]);
}

#[test]
fn goal_signature_is_stable_across_whitespace_and_case_differences() {
    let a = goal_signature("Build   Widget Catalog");
    let b = goal_signature("build widget catalog");
    assert_eq!(a, b);
}

#[tokio::test]
async fn controller_drains_the_queue_and_completes_when_not_waiting_on_empty() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("queue.txt"), "build widget\nship invoicing\n").unwrap();
    let clock = FakeClock::new();
    let archive = SessionArchive::new(dir.path());
    let mut runner = AlwaysPasses;

    let result = run_controller(
        &clock,
        &archive,
        &mut runner,
        config(dir.path()),
        "controller-1",
        None,
    )
    .await
    .unwrap();

    assert_eq!(result.done.len(), 2);
    assert_eq!(result.failed.len(), 0);
    assert_eq!(result.stop_reason, StopReason::QueueDrainedNoWait);
}

#[tokio::test]
async fn controller_stops_on_goal_failure_when_configured_to() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("queue.txt"),
        "build widget\nbroken goal\nship invoicing\n",
    )
    .unwrap();
    let clock = FakeClock::new();
    let archive = SessionArchive::new(dir.path());
    let mut runner = FailsOnKeyword("broken");

    let mut cfg = config(dir.path());
    cfg.stop_on_goal_failure = true;

    let result = run_controller(&clock, &archive, &mut runner, cfg, "controller-2", None)
        .await
        .unwrap();

    assert_eq!(result.stop_reason, StopReason::GoalFailureStop);
    assert_eq!(result.failed.len(), 1);
}

#[tokio::test]
async fn a_busy_lease_refuses_a_second_concurrent_controller() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("queue.txt"), "build widget\n").unwrap();
    let clock = FakeClock::new();
    let archive = SessionArchive::new(dir.path());

    let lease_path = dir.path().join("controller.lease.json");
    let _held = ac_storage::acquire_lease(&lease_path, "someone-else", 60_000, &clock).unwrap();

    let mut runner = AlwaysPasses;
    let result = run_controller(
        &clock,
        &archive,
        &mut runner,
        config(dir.path()),
        "controller-3",
        None,
    )
    .await
    .unwrap();

    assert_eq!(result.stop_reason, StopReason::LeaseBusy);
    assert_eq!(result.cycles_run, 0);
}

use super::*;

#[test]
fn new_goal_has_no_id() {
    let g = Goal::new("build widget catalog service");
    assert_eq!(g.text, "build widget catalog service");
    assert!(g.id.is_none());
}

#[test]
fn with_id_assigns_stable_id() {
    let g = Goal::new("ship it").with_id(GoalId::new("g-1"));
    assert_eq!(g.id, Some(GoalId::new("g-1")));
}

#[yare::parameterized(
    empty = { "" },
    unicode = { "ship the \u{1f680} launcher" },
    long = { "a very long free-form goal description that spans many words and clauses" },
)]
fn round_trips_through_json(text: &str) {
    let g = Goal::new(text);
    let json = serde_json::to_string(&g).expect("serialize");
    let back: Goal = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(g, back);
}

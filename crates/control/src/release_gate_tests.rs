use super::*;

#[test]
fn passes_when_every_signal_is_within_threshold() {
    let inputs = ReleaseGateInputs::default();
    let decision = evaluate(&inputs, &GateThresholds::default());
    assert!(decision.passed);
    assert!(decision.blocked_reasons.is_empty());
}

#[test]
fn blocks_on_a_high_auth_tier_block_rate_with_a_structured_reason() {
    let inputs = ReleaseGateInputs {
        weekly_ops: WeeklyOpsSignals {
            auth_tier_blocks: 55,
            auth_tier_attempts: 100,
            ..Default::default()
        },
        ..Default::default()
    };
    let decision = evaluate(&inputs, &GateThresholds::default());
    assert!(!decision.passed);
    assert!(decision
        .blocked_reasons
        .contains(&"weekly-ops-auth-tier-block-rate-high:55".to_string()));
    assert!(decision
        .recommendations
        .contains(&"interactive-authorization-tier-evaluate".to_string()));
}

#[test]
fn blocks_on_matrix_regressions_over_gate() {
    let inputs = ReleaseGateInputs {
        matrix: MatrixRegressionSignals { regressions: 3 },
        ..Default::default()
    };
    let decision = evaluate(&inputs, &GateThresholds::default());
    assert!(!decision.passed);
    assert!(decision
        .blocked_reasons
        .iter()
        .any(|r| r.starts_with("handoff-moqui-matrix-regressions-over-gate:3/0")));
}

#[test]
fn blocks_on_unknown_capability_coverage() {
    let inputs = ReleaseGateInputs {
        capability: CapabilityCoverageSignals {
            expected: 20,
            declared: 15,
            unknown: 5,
        },
        ..Default::default()
    };
    let decision = evaluate(&inputs, &GateThresholds::default());
    assert!(!decision.passed);
    assert!(decision
        .blocked_reasons
        .iter()
        .any(|r| r.starts_with("capability-coverage-unknown-over-gate:5/20")));
}

#[test]
fn risk_level_orders_low_below_critical() {
    assert!(RiskLevel::Low < RiskLevel::Critical);
    assert!(RiskLevel::Medium < RiskLevel::High);
}

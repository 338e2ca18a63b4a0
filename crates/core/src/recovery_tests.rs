use super::*;
use chrono::Utc;
use proptest::prelude::*;

#[test]
fn signatures_ignore_token_order() {
    let a = FailureSignature::derive("rate_limit", "usage limit reached for session abc123");
    let b = FailureSignature::derive("rate_limit", "abc123 session for reached limit usage");
    assert_eq!(a, b);
}

#[test]
fn signatures_mask_numbers_timestamps_and_paths() {
    let a = FailureSignature::derive(
        "test_failure",
        "2026-07-27T12:00:00Z failed at /home/user/project/src/main.rs:42",
    );
    let b = FailureSignature::derive(
        "test_failure",
        "2026-08-01T09:30:00Z failed at /home/user/project/src/main.rs:99",
    );
    assert_eq!(a, b);
}

#[test]
fn signatures_differ_by_error_class() {
    let a = FailureSignature::derive("rate_limit", "quota exceeded");
    let b = FailureSignature::derive("compile_error", "quota exceeded");
    assert_ne!(a, b);
}

#[test]
fn new_entry_has_zero_success_rate() {
    let entry = RecoveryEntry::new(0, Utc::now(), 30);
    assert_eq!(entry.success_rate(), 0.0);
}

#[test]
fn record_outcome_updates_success_rate() {
    let mut entry = RecoveryEntry::new(0, Utc::now(), 30);
    entry.record_outcome(true, Utc::now());
    entry.record_outcome(false, Utc::now());
    assert_eq!(entry.attempts, 2);
    assert_eq!(entry.successes, 1);
    assert_eq!(entry.success_rate(), 0.5);
}

#[test]
fn stale_entries_detected_by_ttl() {
    let now = Utc::now();
    let old = now - chrono::Duration::days(40);
    let entry = RecoveryEntry::new(0, old, 30);
    assert!(entry.is_stale(now, 30));
    assert!(!entry.is_stale(now, 60));
}

proptest! {
    /// Masking is a fixed point: volatile substrings never grow back
    /// under a second pass, and a re-masked string is byte-identical.
    #[test]
    fn masking_is_idempotent(text in ".{0,200}") {
        let once = mask_volatile(&text);
        let twice = mask_volatile(&once);
        prop_assert_eq!(once, twice);
    }

    /// Derivation never panics and always produces `class:body`.
    #[test]
    fn derive_always_prefixes_with_error_class(class in "[a-z_]{1,16}", text in ".{0,200}") {
        let sig = FailureSignature::derive(&class, &text);
        prop_assert!(sig.as_str().starts_with(&format!("{class}:")));
    }
}

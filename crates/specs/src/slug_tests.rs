// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn basic_slugify() {
    assert_eq!(slugify("Hello World", 24), "hello-world");
}

#[test]
fn stop_words_removed() {
    assert_eq!(slugify("Fix the login button", 24), "fix-login-button");
}

#[test]
fn non_alphanum_replaced() {
    assert_eq!(slugify("fix: login_button!", 24), "fix-login-button");
}

#[test]
fn multiple_hyphens_collapsed() {
    assert_eq!(slugify("foo---bar", 24), "foo-bar");
}

#[test]
fn truncation_at_max_len() {
    // "implement-user-authenticat" is 26 chars, should truncate to 24
    let result = slugify("Implement User Authentication System", 24);
    assert!(result.len() <= 24);
    assert!(!result.ends_with('-'));
    assert_eq!(
        result,
        "implement-user-authenticat"
            .get(..24)
            .unwrap()
            .trim_end_matches('-')
    );
}

#[test]
fn empty_after_stop_word_removal() {
    assert_eq!(slugify("the a an is are", 24), "");
}

#[test]
fn already_clean_slug() {
    assert_eq!(slugify("fix-login-button", 24), "fix-login-button");
}

#[test]
fn unicode_chars_replaced() {
    assert_eq!(slugify("café résumé", 24), "caf-r-sum");
}

#[test]
fn leading_trailing_hyphens_trimmed() {
    assert_eq!(slugify("--hello--", 24), "hello");
}

#[test]
fn single_word() {
    assert_eq!(slugify("deploy", 24), "deploy");
}

#[test]
fn all_special_chars() {
    assert_eq!(slugify("!!@@##$$", 24), "");
}

#[test]
fn exact_max_len() {
    // "abcdefghijklmnopqrstuvwx" is exactly 24 chars
    assert_eq!(
        slugify("abcdefghijklmnopqrstuvwx", 24),
        "abcdefghijklmnopqrstuvwx"
    );
}

#[test]
fn truncation_trims_trailing_hyphen() {
    // Construct input that will produce a slug with a hyphen at position 24
    let result = slugify("abcdefghijklmnopqrstuvw xyz", 24);
    assert!(!result.ends_with('-'));
    assert!(result.len() <= 24);
}

// spec_slug tests

#[test]
fn spec_slug_normal() {
    assert_eq!(spec_slug("Fix the Login Button!", 24), "fix-login-button");
}

#[test]
fn spec_slug_falls_back_to_spec_when_empty() {
    assert_eq!(spec_slug("the a an is", 24), "spec");
}

#[test]
fn spec_slug_truncates() {
    let result = spec_slug(
        "implement user authentication system for the app",
        24,
    );
    assert!(result.len() <= 24);
    assert!(!result.ends_with('-'));
}

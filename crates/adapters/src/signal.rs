// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limit signal classification for adapter subprocess output (§4.4).
//!
//! Plain substring classification, narrowed to the rate-limit signals the
//! governor acts on: HTTP 429, "rate limit", provider "try again in N",
//! "too many requests", plus a numeric Retry-After/"try again in X" hint.

use std::time::Duration;

/// A detected rate-limit signal, with an optional provider-supplied hint for
/// how long to back off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSignal {
    pub retry_after: Option<Duration>,
}

const SIGNAL_MARKERS: &[&str] = &["429", "rate limit", "too many requests", "try again in"];

const RETRY_AFTER_MARKERS: &[&str] = &["retry-after:", "retry after", "try again in"];

/// Scan subprocess output for a rate-limit signal. Returns `None` when
/// nothing in `stdout`/`stderr` matches a known marker.
pub fn classify(stdout: &str, stderr: &str) -> Option<RateLimitSignal> {
    let haystack = format!("{stdout}\n{stderr}").to_lowercase();
    if !SIGNAL_MARKERS.iter().any(|marker| haystack.contains(marker)) {
        return None;
    }
    Some(RateLimitSignal {
        retry_after: extract_retry_after_seconds(&haystack).map(Duration::from_secs),
    })
}

/// Extract the first numeric hint following a Retry-After-style marker.
fn extract_retry_after_seconds(haystack: &str) -> Option<u64> {
    for marker in RETRY_AFTER_MARKERS {
        if let Some(idx) = haystack.find(marker) {
            let rest = haystack[idx + marker.len()..].trim_start();
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if !digits.is_empty() {
                if let Ok(seconds) = digits.parse::<u64>() {
                    return Some(seconds);
                }
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;

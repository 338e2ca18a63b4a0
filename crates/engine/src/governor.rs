// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-Limit Governor (§4.4): interposes on every sub-agent launch and
//! error, refilling a launch-token bucket, tracking per-key backoff
//! windows, and dynamically shrinking/restoring the effective parallel
//! cap under sustained 429 pressure.
//!
//! Deadlines are tracked as `Instant`-keyed entries the same way a single
//! global timer map would be, generalized here to per-key backoff windows
//! plus a token-bucket launch budget.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Named governor presets (§4.4 parameter table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitProfile {
    Conservative,
    Balanced,
    Aggressive,
}

/// Tunable governor parameters, `toml`-deserializable so a project's
/// `.auto/config.toml` can override individual fields on top of a named
/// preset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GovernorParams {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub cooldown_ms: u64,
    pub launch_budget_per_minute: u32,
    pub signal_window_ms: u64,
    pub signal_threshold: u32,
    pub extra_hold_ms: u64,
    pub dynamic_parallel_floor: usize,
}

impl RateLimitProfile {
    pub fn params(self) -> GovernorParams {
        match self {
            RateLimitProfile::Conservative => GovernorParams {
                max_retries: 10,
                backoff_base_ms: 2200,
                backoff_max_ms: 90_000,
                cooldown_ms: 60_000,
                launch_budget_per_minute: 4,
                signal_window_ms: 45_000,
                signal_threshold: 2,
                extra_hold_ms: 5_000,
                dynamic_parallel_floor: 1,
            },
            RateLimitProfile::Balanced => GovernorParams {
                max_retries: 8,
                backoff_base_ms: 1500,
                backoff_max_ms: 60_000,
                cooldown_ms: 45_000,
                launch_budget_per_minute: 8,
                signal_window_ms: 30_000,
                signal_threshold: 3,
                extra_hold_ms: 3_000,
                dynamic_parallel_floor: 1,
            },
            RateLimitProfile::Aggressive => GovernorParams {
                max_retries: 6,
                backoff_base_ms: 1000,
                backoff_max_ms: 30_000,
                cooldown_ms: 20_000,
                launch_budget_per_minute: 16,
                signal_window_ms: 20_000,
                signal_threshold: 4,
                extra_hold_ms: 2_000,
                dynamic_parallel_floor: 2,
            },
        }
    }
}

/// Source of the `(±jitter)` term applied to backoff waits. Production
/// code uses [`RandomJitter`]; tests use [`NoJitter`] for deterministic
/// assertions.
pub trait JitterSource: Send + Sync {
    /// A sample in `[-1.0, 1.0]`.
    fn sample(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&self) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn sample(&self) -> f64 {
        rand::random::<f64>() * 2.0 - 1.0
    }
}

/// Fraction of the computed backoff that jitter may add or subtract.
const JITTER_FRACTION: f64 = 0.2;

/// Outcome of reporting a classified rate-limit signal to the governor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Back off for this long before the next attempt on this key.
    Backoff(Duration),
    /// `maxRetries` consecutive 429s were reached on this key; the caller
    /// should surface a non-transient failure instead of retrying again.
    RetriesExhausted,
}

/// Per-key rate-limit governor state (§4.4).
pub struct RateLimitGovernor<J: JitterSource = RandomJitter> {
    params: GovernorParams,
    ceiling_parallel: usize,
    current_parallel_cap: usize,
    launch_tokens: f64,
    last_refill: Instant,
    backoff_until: HashMap<String, Instant>,
    signal_window_events: HashMap<String, VecDeque<Instant>>,
    consecutive_signals: HashMap<String, u32>,
    last_signal_at: Option<Instant>,
    jitter: J,
}

impl RateLimitGovernor<RandomJitter> {
    pub fn new(profile: RateLimitProfile, ceiling_parallel: usize, now: Instant) -> Self {
        Self::with_jitter(profile, ceiling_parallel, now, RandomJitter)
    }
}

impl<J: JitterSource> RateLimitGovernor<J> {
    pub fn with_jitter(
        profile: RateLimitProfile,
        ceiling_parallel: usize,
        now: Instant,
        jitter: J,
    ) -> Self {
        let params = profile.params();
        Self {
            launch_tokens: params.launch_budget_per_minute as f64,
            params,
            ceiling_parallel,
            current_parallel_cap: ceiling_parallel,
            last_refill: now,
            backoff_until: HashMap::new(),
            signal_window_events: HashMap::new(),
            consecutive_signals: HashMap::new(),
            last_signal_at: None,
            jitter,
        }
    }

    pub fn params(&self) -> GovernorParams {
        self.params
    }

    /// Current launch parallelism ceiling, after any dynamic shrink.
    pub fn current_parallel_cap(&self) -> usize {
        self.current_parallel_cap
    }

    fn refill(&mut self, now: Instant) {
        let elapsed_ms = now.saturating_duration_since(self.last_refill).as_millis() as f64;
        let rate_per_ms = self.params.launch_budget_per_minute as f64 / 60_000.0;
        self.launch_tokens =
            (self.launch_tokens + elapsed_ms * rate_per_ms).min(self.params.launch_budget_per_minute as f64);
        self.last_refill = now;
    }

    /// Step 1: refill by elapsed time, then attempt to consume one launch
    /// token. Returns `false` when the caller should suspend until the
    /// next refill.
    pub fn try_acquire_launch_token(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.launch_tokens >= 1.0 {
            self.launch_tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Step 2: whether any key currently has an active backoff window.
    pub fn is_backoff_active(&self, now: Instant) -> bool {
        self.backoff_until.values().any(|until| *until > now)
    }

    /// Earliest moment every active backoff window will have cleared.
    pub fn backoff_clears_at(&self, now: Instant) -> Option<Instant> {
        self.backoff_until
            .values()
            .copied()
            .filter(|until| *until > now)
            .max()
    }

    /// Steps 3-4: record a classified rate-limit signal for `key` and
    /// return the wait the caller should honor (or that retries are
    /// exhausted and the caller should fail the launch instead).
    pub fn record_rate_limit_signal(
        &mut self,
        key: &str,
        attempt: u32,
        retry_after: Option<Duration>,
        now: Instant,
    ) -> SignalOutcome {
        let consecutive = self.consecutive_signals.entry(key.to_string()).or_insert(0);
        *consecutive += 1;
        if *consecutive > self.params.max_retries {
            return SignalOutcome::RetriesExhausted;
        }

        let exponent = attempt.saturating_sub(1).min(32);
        let base = self.params.backoff_base_ms as f64 * 2f64.powi(exponent as i32);
        let jittered = base * (1.0 + JITTER_FRACTION * self.jitter.sample());
        let mut wait_ms = jittered.max(0.0).min(self.params.backoff_max_ms as f64) as u64;

        if let Some(retry_after) = retry_after {
            let retry_after_ms = retry_after.as_millis() as u64;
            if retry_after_ms > wait_ms && retry_after_ms <= self.params.backoff_max_ms {
                wait_ms = retry_after_ms;
            }
        }

        let existing = self.backoff_until.get(key).copied();
        let candidate = now + Duration::from_millis(wait_ms);
        let new_until = match existing {
            Some(until) if until > now => until + Duration::from_millis(self.params.extra_hold_ms),
            _ => candidate,
        };
        self.backoff_until.insert(key.to_string(), new_until);

        self.record_signal_window(key, now);
        self.last_signal_at = Some(now);

        SignalOutcome::Backoff(new_until.saturating_duration_since(now))
    }

    fn record_signal_window(&mut self, key: &str, now: Instant) {
        let window = self
            .signal_window_events
            .entry(key.to_string())
            .or_default();
        window.push_back(now);
        let cutoff = now
            .checked_sub(Duration::from_millis(self.params.signal_window_ms))
            .unwrap_or(now);
        while window.front().is_some_and(|t| *t < cutoff) {
            window.pop_front();
        }
        if window.len() as u32 >= self.params.signal_threshold {
            let halved = (self.current_parallel_cap / 2).max(self.params.dynamic_parallel_floor);
            self.current_parallel_cap = halved;
        }
    }

    /// Step 4 (restore half): after a clean cooldown with no signals on
    /// any key, double the parallel cap back up toward the ceiling.
    pub fn maybe_restore_parallel_cap(&mut self, now: Instant) {
        let Some(last_signal) = self.last_signal_at else {
            return;
        };
        if now.saturating_duration_since(last_signal) >= Duration::from_millis(self.params.cooldown_ms)
            && self.current_parallel_cap < self.ceiling_parallel
        {
            self.current_parallel_cap = (self.current_parallel_cap * 2).min(self.ceiling_parallel);
            self.last_signal_at = None;
        }
    }

    /// Step 5: a clean (non-rate-limited) outcome resets the retry
    /// counter for `key`.
    pub fn record_clean_outcome(&mut self, key: &str) {
        self.consecutive_signals.remove(key);
    }
}

#[cfg(test)]
#[path = "governor_tests.rs"]
mod tests;

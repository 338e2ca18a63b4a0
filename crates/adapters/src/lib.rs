// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the AI agent subprocess and desktop
//! notifications. Everything here is a thin, testable boundary around a
//! process or OS call — no orchestration logic lives in this crate.

pub mod agent;
mod error;
pub mod notify;
pub mod signal;
pub mod subprocess;
pub mod traced;

pub use agent::{AgentExitClass, AgentOutcome, AgentRequest, AiAdapter, ClaudeLikeAdapter};
pub use error::AdapterError;
pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use signal::{classify as classify_rate_limit, RateLimitSignal};
pub use traced::TracedAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent::{AgentCall, FakeAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};

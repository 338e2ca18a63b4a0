// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ac-core: data model for the autonomous close-loop delivery engine.
//!
//! Every long-lived entity in the system (goals, specs, sessions, recovery
//! memory, locks) is defined here as a plain, serde-serializable value type.
//! Filesystem I/O, locking, and process orchestration live in the crates
//! built on top of this one.

pub mod clock;
pub mod effect;
pub mod errors;
pub mod goal;
pub mod id;
pub mod lock;
pub mod recovery;
pub mod registry;
pub mod scope;
pub mod session;
pub mod spec;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::Effect;
pub use errors::CoreError;
pub use goal::{Goal, GoalId};
pub use id::{IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use lock::{LeaseLockState, TaskLockState};
pub use recovery::{ActionSource, FailureSignature, RecoveryEntry, SelectedAction};
pub use registry::{AgentId, AgentRegistration};
pub use scope::{scoped_name, split_scoped_name, RecoveryScope};
pub use session::{Event, SessionEnvelope, SessionId, SessionKind, SessionStatus};
pub use spec::{Collaboration, Dependency, DependencyType, SpecId, SpecKind, SpecStatus};
pub use time_fmt::{format_elapsed, format_elapsed_ms};

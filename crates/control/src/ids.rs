// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sortable session id generation shared by the batch, program, controller,
//! and governance runners.
//!
//! Session snapshots must be totally ordered by id within their kind (§5),
//! so ids are a zero-padded epoch-millis prefix (sorts chronologically as a
//! plain string) plus a per-process sequence number to break ties within
//! the same millisecond.

use ac_core::{Clock, SessionId};

pub fn next_session_id<C: Clock>(clock: &C, sequence: u64) -> SessionId {
    SessionId::new(format!("{:020}-{:06}", clock.epoch_ms(), sequence))
}

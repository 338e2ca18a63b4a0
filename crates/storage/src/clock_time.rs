// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges `ac_core::Clock`'s epoch-millisecond readings to the
//! `chrono::DateTime<Utc>` timestamps the on-disk document types use.

use chrono::{DateTime, Utc};

pub fn epoch_ms_to_datetime(epoch_ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_ms as i64).unwrap_or_else(Utc::now)
}

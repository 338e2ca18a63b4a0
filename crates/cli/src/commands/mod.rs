// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations, one module per CLI surface entry (§6). Parsers
//! decode arguments and call into `ac-engine`/`ac-control`/`ac-storage`/
//! `ac-specs`; no core logic lives here.

pub mod close_loop;
pub mod close_loop_batch;
pub mod close_loop_controller;
pub mod close_loop_program;
pub mod close_loop_recover;
pub mod governance;
pub mod handoff;
pub mod kpi;
pub mod observability;
pub mod recovery_memory;
pub mod schema;
pub mod session;

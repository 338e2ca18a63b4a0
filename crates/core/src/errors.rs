// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type shared by the data-model layer.

use crate::spec::{SpecId, SpecStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cannot transition spec status from {from} to {to}")]
    InvalidStatusTransition { from: SpecStatus, to: SpecStatus },

    #[error("cyclic dependency detected: {}", cycle_display(cycle))]
    CyclicDependency { cycle: Vec<SpecId> },
}

fn cycle_display(cycle: &[SpecId]) -> String {
    cycle
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

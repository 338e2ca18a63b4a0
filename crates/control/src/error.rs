// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the batch/program/controller/governance layer.

use ac_core::CoreError;
use ac_engine::EngineError;
use ac_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("data model error: {0}")]
    Core(#[from] CoreError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("queue file error: {0}")]
    Queue(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run was cancelled")]
    Cancelled,
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for spec bootstrap, naming, and collaboration metadata.

use ac_core::CoreError;
use ac_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecsError {
    #[error("data model error: {0}")]
    Core(#[from] CoreError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid spec name {0:?}: expected NN-NN-kebab-case")]
    InvalidName(String),

    #[error("spec {0} not found under the project root")]
    NotFound(String),

    #[error("handoff manifest error: {0}")]
    Manifest(String),
}

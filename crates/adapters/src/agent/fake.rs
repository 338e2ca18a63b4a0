// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake AI adapter for testing the orchestrator without spawning real
//! subprocesses.
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::{AgentOutcome, AgentRequest, AiAdapter};
use crate::error::AdapterError;

/// One recorded `run` invocation.
#[derive(Debug, Clone)]
pub struct AgentCall {
    pub spec_id: String,
    pub prompt: String,
}

struct FakeAdapterState {
    calls: Vec<AgentCall>,
    scripted: VecDeque<Result<AgentOutcome, AdapterErrorKind>>,
    default: Option<AgentOutcome>,
}

/// Errors can't be cloned (`std::io::Error` isn't `Clone`), so scripted
/// failures are stored as a reconstructable kind rather than the error
/// itself.
#[derive(Debug, Clone)]
enum AdapterErrorKind {
    Timeout,
    Spawn,
    Io,
}

impl AdapterErrorKind {
    fn into_error(self, description: String) -> AdapterError {
        match self {
            AdapterErrorKind::Timeout => AdapterError::Timeout {
                description,
                timeout_secs: 0,
            },
            AdapterErrorKind::Spawn => AdapterError::Spawn {
                description,
                source: std::io::Error::other("scripted spawn failure"),
            },
            AdapterErrorKind::Io => AdapterError::Io {
                description,
                source: std::io::Error::other("scripted io failure"),
            },
        }
    }
}

/// Scripted, in-memory stand-in for [`super::ClaudeLikeAdapter`]. Queue
/// outcomes with [`FakeAdapter::push_outcome`] / [`FakeAdapter::push_timeout`];
/// each `run` call consumes the next queued entry, falling back to
/// [`FakeAdapter::set_default_outcome`] once the queue is empty.
#[derive(Clone)]
pub struct FakeAdapter {
    inner: Arc<Mutex<FakeAdapterState>>,
}

impl Default for FakeAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeAdapterState {
                calls: Vec::new(),
                scripted: VecDeque::new(),
                default: None,
            })),
        }
    }
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }

    pub fn push_outcome(&self, outcome: AgentOutcome) {
        self.inner.lock().scripted.push_back(Ok(outcome));
    }

    pub fn push_timeout(&self) {
        self.inner
            .lock()
            .scripted
            .push_back(Err(AdapterErrorKind::Timeout));
    }

    pub fn push_spawn_error(&self) {
        self.inner
            .lock()
            .scripted
            .push_back(Err(AdapterErrorKind::Spawn));
    }

    pub fn push_io_error(&self) {
        self.inner
            .lock()
            .scripted
            .push_back(Err(AdapterErrorKind::Io));
    }

    pub fn set_default_outcome(&self, outcome: AgentOutcome) {
        self.inner.lock().default = Some(outcome);
    }
}

#[async_trait]
impl AiAdapter for FakeAdapter {
    async fn run(&self, request: &AgentRequest) -> Result<AgentOutcome, AdapterError> {
        let mut state = self.inner.lock();
        state.calls.push(AgentCall {
            spec_id: request.spec_id.to_string(),
            prompt: request.prompt.clone(),
        });
        let description = format!("fake adapter run for spec {}", request.spec_id);
        if let Some(next) = state.scripted.pop_front() {
            return next.map_err(|kind| kind.into_error(description));
        }
        state
            .default
            .clone()
            .ok_or_else(|| AdapterError::Io {
                description,
                source: std::io::Error::other("FakeAdapter has no scripted or default outcome"),
            })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing wrapper for [`AiAdapter`] implementations.

use async_trait::async_trait;
use tracing::Instrument;

use crate::agent::{AgentOutcome, AgentRequest, AiAdapter};
use crate::error::AdapterError;

/// Wraps an [`AiAdapter`], adding a `tracing::info_span!` around every
/// `run` call with the spec/agent ids attached and the elapsed time logged
/// on completion.
#[derive(Clone)]
pub struct TracedAdapter<A> {
    inner: A,
}

impl<A> TracedAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: AiAdapter> AiAdapter for TracedAdapter<A> {
    async fn run(&self, request: &AgentRequest) -> Result<AgentOutcome, AdapterError> {
        let span = tracing::info_span!(
            "adapter_run",
            spec_id = %request.spec_id,
            agent_id = %request.agent_id,
        );
        async move {
            let started = std::time::Instant::now();
            let result = self.inner.run(request).await;
            match &result {
                Ok(outcome) => tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    exit_class = ?outcome.exit_class,
                    "adapter run completed"
                ),
                Err(err) => tracing::warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "adapter run failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

//! Actor
//!
//! Executes one batch of tool calls concurrently. Every call yields a
//! result, in input order; a failing or cancelled call never affects its
//! siblings.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::ToolError;
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

pub struct Actor {
    tools: Arc<ToolRegistry>,
}

impl Actor {
    pub const fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run all `calls` concurrently and wait for every one of them.
    ///
    /// Once `cancel` fires, calls still in flight resolve to
    /// [`ToolError::Cancelled`] instead of being awaited.
    pub async fn execute(&self, calls: &[ToolCall], cancel: &CancellationToken) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.execute_one(call, cancel)))
            .instrument(tracing::debug_span!("tool batch", size = calls.len()))
            .await
    }

    async fn execute_one(&self, call: &ToolCall, cancel: &CancellationToken) -> ToolResult {
        tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => ToolResult::failure(call, ToolError::Cancelled),
            result = self.tools.execute(call) => result,
        };

        let elapsed_ms = started.elapsed().as_millis();
        match result.error() {
            None => tracing::debug!(tool = %call.name, elapsed_ms, "Tool succeeded"),
            Some(e) => tracing::warn!(tool = %call.name, elapsed_ms, error = %e, "Tool failed"),
        }
        result
    }
}

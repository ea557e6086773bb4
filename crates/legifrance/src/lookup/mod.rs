//! Lookup Service Integration
//!
//! Abstractions and implementations for the external Légifrance lookup
//! server that backs every research tool.

mod http;
mod mock;

pub use http::HttpLookupClient;
pub use mock::MockLookupService;

use std::time::Duration;

use agent_core::ToolError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Lookup service client trait (Strategy pattern)
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Invoke a remote tool and return its text content
    async fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, ToolError>;

    /// Check if the service answers a minimal listing request
    async fn health_check(&self) -> bool;

    /// Service name
    fn name(&self) -> &str;
}

/// Lookup client configuration
#[derive(Clone, Debug)]
pub struct LookupConfig {
    /// Base URL; requests go to `<base_url>/invoke`
    pub base_url: String,

    /// Timeout for a single tool call
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000/mcp/", Duration::from_secs(30))
    }
}

impl LookupConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn invoke_url(&self) -> String {
        format!("{}/invoke", self.base_url)
    }
}

/// Poll `service` until it reports healthy or `timeout` elapses.
pub async fn wait_until_ready(service: &dyn LookupService, timeout: Duration, interval: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        if service.health_check().await {
            tracing::info!(service = service.name(), attempt, "Lookup service ready");
            return true;
        }

        if attempt % 5 == 0 {
            tracing::info!(service = service.name(), attempt, "Still waiting for lookup service");
        }

        if tokio::time::Instant::now() + interval > deadline {
            tracing::warn!(
                service = service.name(),
                attempts = attempt,
                "Lookup service not ready after {:?}",
                timeout
            );
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}

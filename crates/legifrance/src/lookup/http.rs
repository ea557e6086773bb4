//! HTTP Lookup Client
//!
//! Speaks the JSON `tools/call` protocol of the Légifrance lookup server:
//!
//! ```text
//! POST <base>/invoke  {"method": "tools/call", "params": {"name": .., "arguments": {..}}}
//!                 ->  {"result": {"content": [{"type": "text", "text": ..}]}}
//! ```

use std::time::Duration;

use agent_core::{AgentError, ToolError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};

use super::{LookupConfig, LookupService};

/// Upper bound for a readiness probe, independent of the call timeout
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Lookup client over HTTP
pub struct HttpLookupClient {
    client: reqwest::Client,
    config: LookupConfig,
    invoke_url: String,
}

impl HttpLookupClient {
    pub fn new(config: LookupConfig) -> agent_core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("lookup HTTP client: {e}")))?;

        Ok(Self {
            client,
            invoke_url: config.invoke_url(),
            config,
        })
    }

    pub const fn config(&self) -> &LookupConfig {
        &self.config
    }

    fn describe(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("no answer from {} within {:?}", self.config.base_url, self.config.timeout)
        } else if error.is_connect() {
            format!("connection to {} failed: {error}", self.config.base_url)
        } else {
            error.to_string()
        }
    }
}

#[async_trait]
impl LookupService for HttpLookupClient {
    async fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let payload = json!({
            "method": "tools/call",
            "params": {
                "name": name,
                "arguments": arguments,
            }
        });

        let response = self
            .client
            .post(&self.invoke_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(self.describe(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Unavailable(self.describe(&e)))?;

        interpret(status, &body)
    }

    async fn health_check(&self) -> bool {
        let probe = self
            .client
            .post(&self.invoke_url)
            .timeout(PROBE_TIMEOUT)
            .json(&json!({"method": "tools/list", "params": {}}))
            .send()
            .await;

        let response = match probe {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Lookup health probe rejected");
                return false;
            }
            Err(e) => {
                tracing::debug!("Lookup health probe failed: {}", self.describe(&e));
                return false;
            }
        };

        response
            .json::<Value>()
            .await
            .is_ok_and(|body| body.get("result").is_some())
    }

    fn name(&self) -> &str {
        "legifrance-http"
    }
}

/// Map one lookup-server response onto a tool outcome
fn interpret(status: StatusCode, body: &str) -> Result<String, ToolError> {
    if matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    ) {
        return Err(ToolError::Unavailable(format!("HTTP {}", status.as_u16())));
    }
    if !status.is_success() {
        return Err(ToolError::Remote(format!("HTTP {}: {body}", status.as_u16())));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ToolError::Remote(format!("malformed payload: {e}")))?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| text_of(error), str::to_string);
        return Err(ToolError::Remote(message));
    }

    match value.get("result") {
        Some(result) => extract_result(result),
        None => Err(ToolError::Remote(format!("unexpected response: {value}"))),
    }
}

fn extract_result(result: &Value) -> Result<String, ToolError> {
    let Some(content) = result.get("content") else {
        return Ok(text_of(result));
    };

    let text = match content.as_array().and_then(|items| items.first()) {
        Some(item) => item
            .get("text")
            .and_then(Value::as_str)
            .map_or_else(|| text_of(item), str::to_string),
        None => text_of(content),
    };

    if result.get("isError").and_then(Value::as_bool) == Some(true) {
        return Err(ToolError::Remote(text));
    }
    Ok(text)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

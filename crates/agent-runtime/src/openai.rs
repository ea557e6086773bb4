//! OpenAI-compatible LLM Provider
//!
//! Implementation of `LlmProvider` over the `/chat/completions` endpoint with
//! native tool calling. Works against OpenAI itself and against local servers
//! exposing the same API (Ollama under `/v1`, vLLM, LM Studio).

use std::fmt;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// OpenAI-compatible provider configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,

    /// Bearer token; local servers usually ignore it
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".into(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434/v1".into());
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
        let timeout_secs = std::env::var("LLM_TIMEOUT")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(120);

        Self {
            base_url,
            api_key,
            timeout_secs,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// OpenAI-compatible LLM provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env())
    }

    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn health_check(&self) -> Result<bool> {
        let request = self.authorize(self.client.get(self.config.endpoint("models")));
        match request.send().await {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                tracing::warn!(status = %response.status(), "LLM health check failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("LLM health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = create_request(messages, tools, options);
        tracing::debug!(
            model = %options.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending chat completion request"
        );

        let response = self
            .authorize(self.client.post(self.config.endpoint("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ModelUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ModelUnavailable(format!("HTTP {status}: {text}")));
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ModelUnavailable(format!("malformed response: {e}")))?;

        parse_response(response, &options.model)
    }
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum WireMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<WireToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct WireTool {
    r#type: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

// ------------------------------
// Types shared in both directions
// ------------------------------

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(default = "function_type")]
    r#type: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded string per the OpenAI API; some servers send an object
    #[serde(default)]
    arguments: Value,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

// -----------
// Conversions
// -----------

fn create_request(
    messages: &[Message],
    tools: &[ToolSchema],
    options: &GenerationOptions,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: options.model.clone(),
        messages: messages.iter().map(create_message).collect(),
        tools: tools.iter().map(create_tool).collect(),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        stream: false,
    }
}

fn create_message(msg: &Message) -> WireMessage {
    match msg.role {
        Role::System => WireMessage::System {
            content: msg.content.clone(),
        },
        Role::User => WireMessage::User {
            content: msg.content.clone(),
        },
        Role::Assistant => WireMessage::Assistant {
            content: (!msg.content.is_empty() || msg.tool_calls.is_empty())
                .then(|| msg.content.clone()),
            tool_calls: msg
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: Some(call.id.clone()),
                    r#type: function_type(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: Value::String(Value::Object(call.arguments.clone()).to_string()),
                    },
                })
                .collect(),
        },
        Role::Tool => WireMessage::Tool {
            tool_call_id: msg.tool_call_id.clone().unwrap_or_default(),
            content: msg.content.clone(),
        },
    }
}

fn create_tool(schema: &ToolSchema) -> WireTool {
    WireTool {
        r#type: "function",
        function: WireFunction {
            name: schema.name.clone(),
            description: schema.description.clone(),
            parameters: schema.to_json_schema(),
        },
    }
}

fn parse_response(response: ChatCompletionResponse, requested_model: &str) -> Result<Completion> {
    let model = response.model.unwrap_or_else(|| requested_model.to_string());
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::ModelUnavailable("response has no choices".into()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            Ok(ToolCall::new(
                call.id.unwrap_or_default(),
                call.function.name,
                parse_arguments(call.function.arguments)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Completion {
        message: Message::assistant_with_tools(
            choice.message.content.unwrap_or_default(),
            tool_calls,
        ),
        model,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
        finish_reason: choice.finish_reason.as_deref().map(FinishReason::parse),
    })
}

/// Arguments arrive as a JSON-encoded object; anything else is malformed
/// model output.
fn parse_arguments(raw: Value) -> Result<Map<String, Value>> {
    let value = match raw {
        Value::String(text) if text.trim().is_empty() => return Ok(Map::new()),
        Value::String(text) => serde_json::from_str(&text).map_err(|e| {
            AgentError::ModelUnavailable(format!("unparsable tool arguments: {e}"))
        })?,
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(AgentError::ModelUnavailable(format!(
            "tool arguments must be an object, got {other}"
        ))),
    }
}

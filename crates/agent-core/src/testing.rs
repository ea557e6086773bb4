//! Scripted fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{AgentError, Result, ToolError};
use crate::message::Message;
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider};
use crate::tool::{ParamType, ParameterSchema, Tool, ToolCall, ToolSchema};

pub enum Step {
    Reply(Message),
    /// Reply cut off at the token limit
    Truncated(Message),
    Fail(String),
    /// Same tool call forever
    Repeat(ToolCall),
}

/// Provider replaying a fixed script, one step per `complete` call.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<Message>>>,
    pub delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let (message, finish_reason) = {
            let mut script = self.script.lock().unwrap();
            let repeated = match script.front() {
                Some(Step::Repeat(call)) => Some(call.clone()),
                _ => None,
            };
            match repeated {
                Some(call) => (
                    Message::assistant_with_tools("", vec![call]),
                    Some(FinishReason::ToolCalls),
                ),
                None => match script.pop_front() {
                    Some(Step::Reply(msg)) => (msg, None),
                    Some(Step::Truncated(msg)) => (msg, Some(FinishReason::Length)),
                    Some(Step::Fail(reason)) => return Err(AgentError::ModelUnavailable(reason)),
                    Some(Step::Repeat(_)) | None => {
                        return Err(AgentError::ModelUnavailable("script exhausted".into()));
                    }
                },
            }
        };

        Ok(Completion {
            message,
            model: options.model.clone(),
            usage: None,
            finish_reason,
        })
    }
}

/// Tool answering from a closure, optionally after a delay.
pub struct FakeTool {
    pub name: &'static str,
    pub delay: Option<Duration>,
    pub calls: Arc<AtomicUsize>,
    pub respond: fn(&Map<String, Value>) -> std::result::Result<String, ToolError>,
}

impl FakeTool {
    pub fn new(
        name: &'static str,
        respond: fn(&Map<String, Value>) -> std::result::Result<String, ToolError>,
    ) -> Self {
        Self {
            name,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            respond,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Tool for FakeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.into(),
            description: format!("fake {}", self.name),
            parameters: vec![
                ParameterSchema::required("query", ParamType::String, "query"),
                ParameterSchema::optional("max_results", ParamType::Integer, "limit"),
            ],
        }
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> std::result::Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(arguments)
    }
}

pub fn query_call(id: &str, tool: &str, query: &str) -> ToolCall {
    let mut arguments = Map::new();
    arguments.insert("query".into(), Value::String(query.into()));
    ToolCall::new(id, tool, arguments)
}

pub fn echo_query(arguments: &Map<String, Value>) -> std::result::Result<String, ToolError> {
    Ok(format!(
        "résultats pour {}",
        arguments.get("query").and_then(Value::as_str).unwrap_or_default()
    ))
}

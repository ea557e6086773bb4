//! Reasoner
//!
//! One chat-completion call per reasoning step. The Reasoner is stateless
//! apart from its injected provider and options.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{FinishReason, GenerationOptions, LlmProvider};
use crate::tool::ToolSchema;

pub struct Reasoner {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    system_prompt: String,
}

impl Reasoner {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            options,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Ask the model for the next assistant turn.
    ///
    /// The returned message either has no tool calls and non-empty content
    /// (terminal), or at least one tool call with ids unique in the turn.
    pub async fn decide(&self, history: &[Message], tools: &[ToolSchema]) -> Result<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !self.system_prompt.is_empty() {
            messages.push(Message::system(self.system_prompt.as_str()));
        }
        messages.extend_from_slice(history);

        let completion = self
            .provider
            .complete(&messages, tools, &self.options)
            .await
            .map_err(|e| match e {
                AgentError::ModelUnavailable(msg) => AgentError::ModelUnavailable(msg),
                other => AgentError::ModelUnavailable(other.to_string()),
            })?;

        tracing::debug!(
            model = %completion.model,
            finish_reason = ?completion.finish_reason,
            prompt_tokens = completion.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = completion.usage.as_ref().map(|u| u.completion_tokens),
            "Model call finished"
        );
        if completion.finish_reason == Some(FinishReason::Length) {
            tracing::warn!(
                max_tokens = self.options.max_tokens,
                "Model reply truncated at the token limit"
            );
        }

        normalize(completion.message)
    }
}

fn normalize(mut message: Message) -> Result<Message> {
    if message.tool_calls.is_empty() && message.content.trim().is_empty() {
        return Err(AgentError::ModelUnavailable(
            "model returned neither content nor tool calls".into(),
        ));
    }

    let mut seen = HashSet::new();
    for call in &mut message.tool_calls {
        if call.id.is_empty() || !seen.insert(call.id.clone()) {
            call.id = uuid::Uuid::new_v4().to_string();
            seen.insert(call.id.clone());
        }
    }

    message.role = crate::message::Role::Assistant;
    message.tool_call_id = None;
    Ok(message)
}

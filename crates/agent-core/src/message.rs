//! Conversation Messages
//!
//! Standard message format used across the agent system. Messages are
//! immutable once created; histories only ever grow by appending.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::ToolCall;

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions (never persisted in a thread)
    System,
    /// User input
    User,
    /// Assistant (LLM) response, possibly carrying tool calls
    Assistant,
    /// Tool observation
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content (may be empty on assistant turns that only call tools)
    #[serde(default)]
    pub content: String,

    /// Tool calls requested by an assistant turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Set on tool observations: the id of the call this answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message requesting tool calls
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.tool_calls = tool_calls;
        msg
    }

    /// Create a tool observation message
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Whether this assistant message ends the reasoning loop
    pub fn is_final_answer(&self) -> bool {
        self.role == Role::Assistant && self.tool_calls.is_empty()
    }
}

/// Ordered chat history
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub const fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Add a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages from `start` onwards
    pub fn tail(&self, start: usize) -> &[Message] {
        self.messages.get(start..).unwrap_or_default()
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Verify that every assistant message with N tool calls is followed by
    /// exactly N tool messages answering those calls, in any order.
    ///
    /// A trailing assistant message whose observations have not arrived yet
    /// is only accepted when `allow_pending` is set.
    pub fn check_tool_round_trip(&self, allow_pending: bool) -> Result<(), String> {
        let mut idx = 0;
        while idx < self.messages.len() {
            let msg = &self.messages[idx];
            idx += 1;

            if msg.role == Role::Tool {
                return Err(format!(
                    "tool message {:?} does not follow an assistant tool call",
                    msg.tool_call_id
                ));
            }
            if msg.role != Role::Assistant || msg.tool_calls.is_empty() {
                continue;
            }

            let mut expected: HashSet<&str> =
                msg.tool_calls.iter().map(|c| c.id.as_str()).collect();
            let requested = expected.len();
            let mut answered = 0;

            while let Some(next) = self.messages.get(idx) {
                if next.role != Role::Tool {
                    break;
                }
                let id = next.tool_call_id.as_deref().unwrap_or_default();
                if !expected.remove(id) {
                    return Err(format!("unexpected tool_call_id {id:?}"));
                }
                answered += 1;
                idx += 1;
            }

            let at_end = idx == self.messages.len();
            if answered != requested && !(allow_pending && answered == 0 && at_end) {
                return Err(format!(
                    "{answered} of {requested} tool calls answered before next turn"
                ));
            }
        }
        Ok(())
    }
}

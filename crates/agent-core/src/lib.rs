//! # agent-core
//!
//! Core agent logic: a tool-using ReAct loop with a provider-agnostic LLM
//! abstraction, a validated tool registry and per-thread conversation memory.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Agent                              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────────────┐  │
//! │  │  Reasoner   │──▶│    Actor    │──▶│   ToolRegistry     │  │
//! │  │ LlmProvider │◀──│  (fan-out)  │   │  (schemas + impls) │  │
//! │  └─────────────┘   └─────────────┘   └────────────────────┘  │
//! │            ▲                                                 │
//! │            └────────── ThreadStore (history per thread)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Ollama, OpenAI or any
//! other OpenAI-compatible endpoint without changing agent logic.

pub mod actor;
pub mod error;
pub mod message;
pub mod provider;
pub mod reasoner;
pub mod reasoning;
pub mod session;
pub mod tool;

#[cfg(test)]
mod testing;

pub use actor::Actor;
pub use error::{AgentError, Result, ToolError};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage};
pub use reasoner::Reasoner;
pub use reasoning::{Agent, AgentBuilder, AgentConfig, AgentEvent, AgentStream};
pub use session::{MemoryThreadStore, ThreadId, ThreadStore, ThreadSummary};
pub use tool::{ParamType, ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
pub use tokio_util::sync::CancellationToken;

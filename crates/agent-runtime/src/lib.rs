//! # agent-runtime
//!
//! Runtime providers for the legal research agent.
//!
//! ## Providers
//!
//! - **OpenAI-compatible** (default): any `/chat/completions` endpoint with
//!   native tool calling. Ollama exposes one under `/v1`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::openai::{OpenAiConfig, OpenAiProvider};
//!
//! let provider = OpenAiProvider::from_config(OpenAiConfig::default())?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentBuilder, AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry,
};

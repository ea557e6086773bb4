//! Error Types
//!
//! Two layers: [`AgentError`] aborts a turn and reaches the caller, while
//! [`ToolError`] describes a single tool invocation and is folded back into
//! the conversation as an observation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Turn-level failures
#[derive(Error, Debug)]
pub enum AgentError {
    /// Chat-completion call failed or returned unusable output
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Reasoning/acting cycle cap reached
    #[error("Maximum iterations ({0}) reached")]
    LoopExceeded(usize),

    /// Turn cancelled by the caller or by the turn timeout
    #[error("Turn cancelled")]
    Cancelled,

    /// Thread store error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error (malformed tool definition, bad setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::ModelUnavailable(_) => {
                "The language model is currently unavailable. Please try again.".into()
            }
            Self::LoopExceeded(_) => {
                "The request needed too many research steps. Please try a more precise question."
                    .into()
            }
            Self::Cancelled => "The request was cancelled before an answer was produced.".into(),
            Self::Config(msg) => format!("Service configuration error: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }

    /// Stable machine-readable code for API responses
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            Self::LoopExceeded(_) => "LOOP_EXCEEDED",
            Self::Cancelled => "CANCELLED",
            Self::Session(_) => "SESSION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

/// Outcome of a failed tool invocation.
///
/// Every variant is recoverable: the text is shown to the model on the next
/// reasoning step so it can correct itself.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ToolError {
    /// Arguments failed schema validation; nothing was dispatched
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool name not present in the registry
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Lookup service unreachable or timed out
    #[error("Lookup service unavailable: {0}")]
    Unavailable(String),

    /// Lookup service answered with a failure, message kept verbatim
    #[error("{0}")]
    Remote(String),

    /// Invocation abandoned because the turn was cancelled
    #[error("Tool call cancelled")]
    Cancelled,
}

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to reach completion endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Structured output failed validation: {0}")]
    SchemaViolation(String),

    #[error("Tool calls without a tool result: {}", .0.join(", "))]
    UnansweredToolCalls(Vec<String>),
}

impl ChatError {
    /// Whether resending the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Transport(_) | ChatError::Timeout(_) => true,
            ChatError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

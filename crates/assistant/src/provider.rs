//! Assistant trait and error type.

use async_trait::async_trait;
use wmforge_common::error::WmforgeError;

/// Recoverable failures of one question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssistantError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response blocked: {0}")]
    Blocked(String),

    #[error("no answer in response")]
    EmptyAnswer,

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<AssistantError> for WmforgeError {
    fn from(err: AssistantError) -> Self {
        WmforgeError::assistant(err.to_string())
    }
}

/// A hosted model that answers questions about the current command.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Answer `question` given a short `context` summary.
    async fn ask(&self, context: &str, question: &str) -> Result<String, AssistantError>;
}

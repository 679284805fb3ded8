//! Error types for the chat subsystem.

use thiserror::Error;

/// Chat subsystem error type.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// HTTP request failed (network, timeout or non-success status).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The operation requires an identified user.
    #[error("no identified user")]
    Unauthenticated,
    /// The assistant answered with an empty reply.
    #[error("assistant returned an empty reply")]
    EmptyReply,
}

impl ChatError {
    /// Check if this error is likely to go away on a manual retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|status| status.is_server_error())
            }
            Self::EmptyReply => true,
            _ => false,
        }
    }
}

/// Convenience result alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

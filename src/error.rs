//! Error types for chatdesk

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ChatError`]
pub type Result<T> = std::result::Result<T, ChatError>;

/// Main error type for chatdesk
#[derive(Debug, Error)]
pub enum ChatError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error reported by the provider (either an HTTP error status or an
    /// error object embedded in a 200-status stream)
    #[error("API error: {0}")]
    Api(String),

    /// The selected model does not accept image content
    #[error("The selected model does not support image input")]
    ModelNotSupportImage,

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// Stable machine-readable code for errors the UI layer branches on.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::ModelNotSupportImage => Some("model_not_support_image"),
            _ => None,
        }
    }
}

impl From<String> for ChatError {
    fn from(s: String) -> Self {
        ChatError::Other(s)
    }
}

impl From<&str> for ChatError {
    fn from(s: &str) -> Self {
        ChatError::Other(s.to_string())
    }
}

//! Error types for the taskboard client

use thiserror::Error;

/// Failure of a call against the tracker backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("request failed with status {status}{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A configured header could not be encoded
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) | ApiError::InvalidHeader(_) => None,
        }
    }

    /// The `message` field of the server's error body, if it sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text shown inline in a form: the server's message, or the given default
    pub fn user_message(&self, default: &str) -> String {
        self.server_message()
            .filter(|m| !m.is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Failure of the local token store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Invalid or missing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

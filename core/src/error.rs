//! Error types for the user API client.
//!
//! # Design
//! Every failure the client can observe lands in one `ApiError`, because the
//! retry loop treats them all alike and the controller only ever shows the
//! message text. `Http` carries the server's own `message` when the error
//! body had one, so `Display` prints it unchanged.

use thiserror::Error;

/// Errors produced while building, sending or parsing an API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code of an application error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 4xx application errors.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }
}

//! Client error types

use thiserror::Error;

/// Errors returned by a collection source
///
/// Carries rendered messages rather than the underlying `reqwest` error so
/// failures can be cloned into store events and refresh reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection failure, timeout, or a non-2xx status without a
    /// not-found meaning
    #[error("Transport error: {0}")]
    Transport(String),

    /// Body was not valid JSON, or not the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Server reported the collection name as unknown
    #[error("Collection not found: {0}")]
    NotFound(String),

    /// Name cannot be addressed as a single path segment
    #[error("Invalid collection name: {0:?}")]
    InvalidName(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let target = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "server".to_string());

        if err.is_timeout() {
            ClientError::Transport(format!("request to {} timed out", target))
        } else if err.is_connect() {
            ClientError::Transport(format!("cannot connect to {}: {}", target, err))
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

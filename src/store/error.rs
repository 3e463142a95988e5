//! Store error types

use thiserror::Error;

use crate::client::ClientError;

/// Errors surfaced by store actions and mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The collection source failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Activation requested for a name outside the current list
    #[error("Invalid collection name: {0}")]
    InvalidName(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

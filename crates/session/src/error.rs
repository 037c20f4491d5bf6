//! Error types for the session layer.

use thiserror::Error;

/// Errors from the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Error from the underlying HTTP client.
    #[error(transparent)]
    Client(#[from] docqa_client::Error),
}

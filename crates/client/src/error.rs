//! Error types for the DocQA client.

use std::fmt;

use docqa_core::ErrorKind;
use thiserror::Error;

/// The backend operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /upload/`
    Upload,
    /// `GET /documents/`
    ListDocuments,
    /// `POST /ask/`
    Ask,
}

impl Operation {
    /// Message used when the backend gives no detail.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Upload => "Upload failed",
            Self::ListDocuments => "Failed to fetch documents",
            Self::Ask => "Question failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::ListDocuments => write!(f, "list documents"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// Errors that can occur when talking to the document backend.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The backend could not be reached (DNS, refused connection, timeout).
    #[error("{operation}: {message}")]
    Connection {
        operation: Operation,
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("{operation}: HTTP {status}: {detail}")]
    Api {
        operation: Operation,
        status: u16,
        /// Backend-supplied detail, or the operation's fallback message.
        detail: String,
    },

    /// A success response whose body could not be decoded.
    #[error("{operation}: failed to deserialize response: {message}")]
    Deserialization {
        operation: Operation,
        message: String,
    },

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns `true` if the backend could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// The operation that failed, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Connection { operation, .. }
            | Self::Api { operation, .. }
            | Self::Deserialization { operation, .. } => Some(*operation),
            Self::Configuration(_) => None,
        }
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::TransportUnreachable,
            Self::Api { .. } | Self::Deserialization { .. } | Self::Configuration(_) => {
                ErrorKind::BackendError
            }
        }
    }

    /// Text suitable for showing to a user: backend detail when present,
    /// without the operation or status prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection { message, .. } => message.clone(),
            Self::Api { detail, .. } => detail.clone(),
            Self::Deserialization { operation, .. } => operation.fallback_message().to_string(),
            Self::Configuration(message) => message.clone(),
        }
    }
}

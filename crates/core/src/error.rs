use serde::{Deserialize, Serialize};

/// Coarse classification of failures seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The backend host could not be reached. Demotes the connection state.
    TransportUnreachable,
    /// The backend answered with an error; its detail is shown verbatim.
    BackendError,
    /// Input rejected locally before any request. Never shown to the user.
    ValidationSkip,
}

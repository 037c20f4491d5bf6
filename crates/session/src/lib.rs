//! Client-side state for document question answering.
//!
//! Three components hold all mutable state, each owning its own slice:
//!
//! - [`ConnectionMonitor`] probes backend reachability and gates loading.
//! - [`DocumentStore`] owns the document list and the selection.
//! - [`ChatSession`] owns the message history of the selected document.
//!
//! [`Workspace`] wires them together: a successful probe loads documents,
//! selecting a document resets the chat, and transport failures demote the
//! connection. Operations return notifications as values instead of
//! showing them; the front end decides how to present them.

mod chat;
mod config;
mod connection;
mod documents;
mod error;
pub mod testing;
mod workspace;

pub use chat::{ChatSession, SkipReason, SubmitOutcome};
pub use config::{DEFAULT_ENDPOINT, DEFAULT_MAX_UPLOAD_BYTES, SessionConfig};
pub use connection::{ConnectionEvent, ConnectionMonitor};
pub use documents::{DocumentStore, LoadOutcome, SelectionObserver, UploadOutcome};
pub use error::SessionError;
pub use workspace::{Report, Workspace};

/// Re-export client and core types for consumers.
pub use docqa_client;
pub use docqa_core;

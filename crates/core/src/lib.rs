pub mod api;
pub mod connection;
pub mod document;
pub mod error;
pub mod message;
pub mod notification;
pub mod upload;

pub use api::{AnswerResponse, ApiDocument, AskRequest, ErrorBody, UploadResponse};
pub use connection::ConnectionState;
pub use document::{Document, DocumentStatus, format_size};
pub use error::ErrorKind;
pub use message::{ChatMessage, Role};
pub use notification::{Notification, NotificationLevel};
pub use upload::UploadFile;

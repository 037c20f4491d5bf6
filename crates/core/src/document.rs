use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiDocument, UploadResponse};

/// Size label used for documents whose byte count is unknown.
pub const UNKNOWN_SIZE: &str = "N/A";

/// Prefix of client-generated placeholder identifiers.
pub const PLACEHOLDER_PREFIX: &str = "local-";

/// Processing state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Upload in flight; the id is still a placeholder.
    Processing,
    /// Stored by the backend and available for questions.
    Ready,
    /// Upload failed.
    Error,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A document tracked by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Placeholder id while processing, server id once ready.
    pub id: String,
    /// Display name (the uploaded file name).
    pub name: String,
    /// Calendar date of the upload.
    pub upload_date: NaiveDate,
    /// Human-readable size, e.g. `"2.4 MB"`.
    pub size: String,
    pub status: DocumentStatus,
}

impl Document {
    /// Create a placeholder for a file that is about to be uploaded.
    pub fn placeholder(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4()),
            name: name.into(),
            upload_date: Utc::now().date_naive(),
            size: format_size(size_bytes),
            status: DocumentStatus::Processing,
        }
    }

    /// Whether the document can be selected and questioned.
    pub fn is_ready(&self) -> bool {
        self.status == DocumentStatus::Ready
    }

    /// Whether the id is still client-generated.
    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }

    /// The server id, if this document has one.
    pub fn server_id(&self) -> Option<i64> {
        if self.is_placeholder() {
            return None;
        }
        self.id.parse().ok()
    }

    /// Mark this placeholder as stored under the server-assigned id.
    pub fn confirm(&mut self, response: &UploadResponse) {
        self.id = response.id.to_string();
        self.status = DocumentStatus::Ready;
    }
}

impl From<ApiDocument> for Document {
    /// Listed documents are always fully processed.
    fn from(doc: ApiDocument) -> Self {
        Self {
            id: doc.id.to_string(),
            name: doc.filename,
            upload_date: doc.upload_date.date_naive(),
            size: UNKNOWN_SIZE.to_string(),
            status: DocumentStatus::Ready,
        }
    }
}

/// Format a byte count as megabytes with one decimal.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

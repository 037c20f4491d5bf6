//! The document list, upload lifecycle, and selection.

use std::sync::Arc;

use docqa_client::{DocumentApi, Error};
use docqa_core::{
    ConnectionState, Document, DocumentStatus, ErrorKind, Notification, UploadFile,
    UploadResponse,
};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Notified whenever a document is selected, including re-selection of the
/// current one.
pub trait SelectionObserver: Send + Sync {
    fn selection_changed(&self, document: &Document);
}

/// Result of [`DocumentStore::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Not connected; no request was made.
    Skipped,
    /// The collection was replaced by the server list.
    Loaded {
        /// Number of documents the server listed.
        count: usize,
        /// Set when nothing was selected and the first entry was picked.
        auto_selected: Option<Document>,
    },
}

/// Result of [`DocumentStore::upload`]. Upload failures never escape as
/// errors; they are recorded on the placeholder.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// Rejected locally before any request; no placeholder was created.
    Skipped(String),
    /// The placeholder now carries the server id and is ready.
    Uploaded {
        document: Document,
        notification: Notification,
    },
    /// The placeholder was marked as errored.
    Failed {
        document: Document,
        error: Error,
        notification: Notification,
    },
}

impl UploadOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Skipped(_) => None,
            Self::Uploaded { notification, .. } | Self::Failed { notification, .. } => {
                Some(notification)
            }
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// How the upload failed, if it did.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Skipped(_) => Some(ErrorKind::ValidationSkip),
            Self::Uploaded { .. } => None,
            Self::Failed { error, .. } => Some(error.kind()),
        }
    }

    /// The affected document, if one was created.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Skipped(_) => None,
            Self::Uploaded { document, .. } | Self::Failed { document, .. } => Some(document),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Document>,
    /// Snapshot of the selected document. Kept even if a reload drops it.
    selected: Option<Document>,
}

/// Owns the known documents and the selection cursor.
pub struct DocumentStore {
    api: Arc<dyn DocumentApi>,
    connection: watch::Receiver<ConnectionState>,
    max_upload_bytes: u64,
    inner: Mutex<Inner>,
    observers: RwLock<Vec<Arc<dyn SelectionObserver>>>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("inner", &*self.inner.lock())
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Create an empty store. Loads only go out while `connection` reads
    /// `Connected`.
    pub fn new(
        api: Arc<dyn DocumentApi>,
        connection: watch::Receiver<ConnectionState>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            api,
            connection,
            max_upload_bytes,
            inner: Mutex::new(Inner::default()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for selection changes.
    pub fn subscribe(&self, observer: Arc<dyn SelectionObserver>) {
        self.observers.write().push(observer);
    }

    /// All documents in display order.
    pub fn documents(&self) -> Vec<Document> {
        self.inner.lock().documents.clone()
    }

    /// The selected document, possibly stale after a reload.
    pub fn selected(&self) -> Option<Document> {
        self.inner.lock().selected.clone()
    }

    /// Replace the collection with the server's list.
    ///
    /// Uploads still in flight keep their placeholders so their responses
    /// can land. On error nothing changes.
    pub async fn load(&self) -> Result<LoadOutcome, Error> {
        if !self.connection.borrow().is_connected() {
            debug!("not connected, skipping document load");
            return Ok(LoadOutcome::Skipped);
        }

        let listed = self.api.list_documents().await.inspect_err(|e| {
            warn!(error = %e, "failed to load documents");
        })?;
        let count = listed.len();

        let auto_selected = {
            let mut inner = self.inner.lock();
            let pending: Vec<Document> = inner
                .documents
                .drain(..)
                .filter(|d| d.status == DocumentStatus::Processing)
                .collect();
            inner.documents = listed.into_iter().map(Document::from).collect();
            inner.documents.extend(pending);

            match inner.selected.as_ref().map(|s| s.id.clone()) {
                None => {
                    let first = inner.documents.iter().find(|d| d.is_ready()).cloned();
                    inner.selected.clone_from(&first);
                    first
                }
                Some(id) => {
                    if let Some(fresh) = inner.documents.iter().find(|d| d.id == id).cloned() {
                        inner.selected = Some(fresh);
                    } else {
                        debug!(%id, "selected document no longer listed, keeping selection");
                    }
                    None
                }
            }
        };

        debug!(count, "documents loaded");
        if let Some(document) = &auto_selected {
            self.notify_selection(document);
        }
        Ok(LoadOutcome::Loaded {
            count,
            auto_selected,
        })
    }

    /// Upload a file, tracking it with a placeholder entry.
    pub async fn upload(&self, file: &UploadFile) -> UploadOutcome {
        if let Some(reason) = self.validate(file) {
            debug!(filename = %file.name, %reason, "upload skipped");
            return UploadOutcome::Skipped(reason);
        }

        let placeholder = Document::placeholder(file.name.clone(), file.len());
        let placeholder_id = placeholder.id.clone();
        self.inner.lock().documents.push(placeholder.clone());
        debug!(id = %placeholder_id, filename = %file.name, "upload started");

        match self.api.upload_document(file).await {
            Ok(response) => {
                let document = self.confirm(&placeholder_id, &response);
                let document = document.unwrap_or_else(|| {
                    let mut doc = placeholder;
                    doc.confirm(&response);
                    doc
                });
                info!(id = %document.id, filename = %document.name, "document uploaded");
                UploadOutcome::Uploaded {
                    document,
                    notification: Notification::success(
                        "Success",
                        "Document uploaded successfully",
                    ),
                }
            }
            Err(error) => {
                warn!(id = %placeholder_id, error = %error, "upload failed");
                let document = self
                    .update(&placeholder_id, |doc| doc.status = DocumentStatus::Error)
                    .unwrap_or_else(|| Document {
                        status: DocumentStatus::Error,
                        ..placeholder
                    });
                UploadOutcome::Failed {
                    document,
                    notification: Notification::error("Upload Failed", error.user_message()),
                    error,
                }
            }
        }
    }

    /// Select a ready document. Returns `None` (and changes nothing) if the
    /// id is unknown or the document is not ready.
    pub fn select(&self, id: &str) -> Option<Document> {
        let document = {
            let mut inner = self.inner.lock();
            let document = inner.documents.iter().find(|d| d.id == id)?.clone();
            if !document.is_ready() {
                debug!(%id, status = %document.status, "document not selectable");
                return None;
            }
            inner.selected = Some(document.clone());
            document
        };
        debug!(%id, "document selected");
        self.notify_selection(&document);
        Some(document)
    }

    fn validate(&self, file: &UploadFile) -> Option<String> {
        if !file.is_pdf() {
            return Some(format!("{} is not a PDF", file.name));
        }
        if file.len() > self.max_upload_bytes {
            return Some(format!(
                "{} is {} bytes, larger than the {} byte limit",
                file.name,
                file.len(),
                self.max_upload_bytes
            ));
        }
        None
    }

    /// Confirm a placeholder in place. A reload that landed while the
    /// upload was in flight may already list the server id; that entry is
    /// dropped so the id stays unique.
    fn confirm(&self, placeholder_id: &str, response: &UploadResponse) -> Option<Document> {
        let mut inner = self.inner.lock();
        let Some(pos) = inner.documents.iter().position(|d| d.id == placeholder_id) else {
            warn!(id = %placeholder_id, "document vanished before its upload finished");
            return None;
        };
        inner.documents[pos].confirm(response);
        let document = inner.documents[pos].clone();

        let mut index = 0;
        inner.documents.retain(|d| {
            let keep = index == pos || d.id != document.id;
            index += 1;
            keep
        });
        Some(document)
    }

    /// Apply `f` to the document with `id`, returning the updated copy.
    fn update(&self, id: &str, f: impl FnOnce(&mut Document)) -> Option<Document> {
        let mut inner = self.inner.lock();
        let Some(document) = inner.documents.iter_mut().find(|d| d.id == id) else {
            warn!(%id, "document vanished before its upload finished");
            return None;
        };
        f(document);
        Some(document.clone())
    }

    fn notify_selection(&self, document: &Document) {
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.selection_changed(document);
        }
    }
}

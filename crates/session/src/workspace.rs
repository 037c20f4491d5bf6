use std::sync::Arc;

use docqa_client::{DocQaClientBuilder, DocumentApi};
use docqa_core::{ConnectionState, Document, ErrorKind, Notification, UploadFile};
use tracing::{debug, info};

use crate::chat::{ChatSession, SkipReason, SubmitOutcome};
use crate::config::SessionConfig;
use crate::connection::{ConnectionEvent, ConnectionMonitor};
use crate::documents::{DocumentStore, LoadOutcome, UploadOutcome};
use crate::error::SessionError;

/// The outcome of a workspace operation plus the notifications it raised,
/// in the order they were raised.
#[derive(Debug, Clone)]
pub struct Report<T> {
    pub outcome: T,
    pub notifications: Vec<Notification>,
}

impl<T> Report<T> {
    fn new(outcome: T) -> Self {
        Self {
            outcome,
            notifications: Vec::new(),
        }
    }

    fn extend<U>(&mut self, other: Report<U>) -> U {
        self.notifications.extend(other.notifications);
        other.outcome
    }
}

/// Connection, documents, and chat wired together.
///
/// Selecting a document resets the chat. A settled probe loads documents
/// once. Uploads and questions are skipped unless connected, and operations
/// that fail to reach the backend demote the connection.
#[derive(Debug)]
pub struct Workspace {
    monitor: ConnectionMonitor,
    store: DocumentStore,
    chat: Arc<ChatSession>,
}

impl Workspace {
    pub fn new(api: Arc<dyn DocumentApi>, config: &SessionConfig) -> Self {
        let monitor = ConnectionMonitor::new(api.clone(), config.endpoint.clone());
        let store = DocumentStore::new(api.clone(), monitor.subscribe(), config.max_upload_bytes);
        let chat = Arc::new(ChatSession::new(api));
        store.subscribe(chat.clone());
        Self {
            monitor,
            store,
            chat,
        }
    }

    /// Validate `config` and build an HTTP-backed workspace.
    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let mut builder = DocQaClientBuilder::new(config.endpoint.trim());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.monitor
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn connection(&self) -> ConnectionState {
        self.monitor.state()
    }

    /// Probe the backend and, once connected, load documents.
    ///
    /// Returns the state the probe settled in. A probe that coalesced into
    /// one already in flight reports the current state and nothing else.
    pub async fn connect(&self) -> Report<ConnectionState> {
        let mut report = Report::new(ConnectionState::Unknown);
        match self.monitor.probe().await {
            Some(ConnectionEvent::Established) => {
                report.extend(self.refresh().await);
            }
            Some(ConnectionEvent::Lost(notification)) => report.notifications.push(notification),
            None => {}
        }
        report.outcome = self.monitor.state();
        report
    }

    /// Probe again after a failure.
    pub async fn retry(&self) -> Report<ConnectionState> {
        debug!("retrying backend connection");
        self.connect().await
    }

    /// Reload the document list. `None` means the load failed.
    pub async fn refresh(&self) -> Report<Option<LoadOutcome>> {
        match self.store.load().await {
            Ok(outcome) => Report::new(Some(outcome)),
            Err(error) => {
                let mut report = Report::new(None);
                report
                    .notifications
                    .push(Notification::error("Error", error.user_message()));
                self.demote_on(Some(error.kind()), &mut report);
                report
            }
        }
    }

    /// Upload `file`; a successful upload reloads the list.
    pub async fn upload(&self, file: &UploadFile) -> Report<UploadOutcome> {
        if !self.connection().is_connected() {
            debug!(filename = %file.name, "not connected, skipping upload");
            return Report::new(UploadOutcome::Skipped("backend is not connected".into()));
        }

        let outcome = self.store.upload(file).await;
        let mut report = Report::new(outcome);
        if let Some(notification) = report.outcome.notification() {
            report.notifications.push(notification.clone());
        }
        if let UploadOutcome::Uploaded { document, .. } = &report.outcome {
            info!(id = %document.id, "refreshing documents after upload");
            report.extend(self.refresh().await);
        }
        self.demote_on(report.outcome.error_kind(), &mut report);
        report
    }

    /// Select a ready document, resetting the chat.
    pub fn select(&self, id: &str) -> Option<Document> {
        self.store.select(id)
    }

    /// Ask about the selected document.
    pub async fn ask(&self, question: &str) -> Report<SubmitOutcome> {
        if !self.connection().is_connected() {
            debug!("not connected, skipping question");
            return Report::new(SubmitOutcome::Skipped(SkipReason::Disconnected));
        }

        let selected = self.store.selected();
        let outcome = self.chat.submit(question, selected.as_ref()).await;
        let mut report = Report::new(outcome);
        if let Some(notification) = report.outcome.notification() {
            report.notifications.push(notification.clone());
        }
        self.demote_on(report.outcome.error_kind(), &mut report);
        report
    }

    fn demote_on<T>(&self, kind: Option<ErrorKind>, report: &mut Report<T>) {
        if kind != Some(ErrorKind::TransportUnreachable) {
            return;
        }
        if let Some(ConnectionEvent::Lost(notification)) = self.monitor.report_unreachable() {
            report.notifications.push(notification);
        }
    }
}

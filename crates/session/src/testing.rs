//! An in-memory [`DocumentApi`] for tests.
//!
//! [`RecordingApi`] behaves like a small backend: uploads are stored and show
//! up in later listings, questions get a canned answer. Results can be
//! scripted per call, and uploads or questions can be held at a gate so a
//! test controls exactly when each response arrives. Every call yields to
//! the scheduler at least once, like a real round-trip would.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use docqa_client::{DocumentApi, Error, Operation};
use docqa_core::{AnswerResponse, ApiDocument, UploadFile, UploadResponse};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// A call received by a [`RecordingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Upload { filename: String },
    ListDocuments,
    Ask { document_id: i64, question: String },
    HealthCheck,
}

/// Holds calls until the test releases them. Open gates never block.
#[derive(Debug)]
struct Gate {
    closed: AtomicBool,
    permits: Semaphore,
}

impl Gate {
    fn open() -> Self {
        Self {
            closed: AtomicBool::new(false),
            permits: Semaphore::new(0),
        }
    }

    async fn pass(&self) {
        tokio::task::yield_now().await;
        if self.closed.load(Ordering::SeqCst) {
            // The semaphore is never closed, so acquire cannot fail.
            if let Ok(permit) = self.permits.acquire().await {
                permit.forget();
            }
        }
    }
}

/// A scripted, call-recording fake backend.
#[derive(Debug)]
pub struct RecordingApi {
    healthy: AtomicBool,
    next_id: AtomicI64,
    documents: Mutex<Vec<ApiDocument>>,
    list_results: Mutex<VecDeque<Result<Vec<ApiDocument>, Error>>>,
    upload_results: Mutex<VecDeque<Result<UploadResponse, Error>>>,
    answers: Mutex<VecDeque<Result<AnswerResponse, Error>>>,
    calls: Mutex<Vec<ApiCall>>,
    upload_gate: Gate,
    ask_gate: Gate,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingApi {
    /// A healthy backend with no documents.
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            next_id: AtomicI64::new(1),
            documents: Mutex::new(Vec::new()),
            list_results: Mutex::new(VecDeque::new()),
            upload_results: Mutex::new(VecDeque::new()),
            answers: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            upload_gate: Gate::open(),
            ask_gate: Gate::open(),
        }
    }

    /// Seed the stored documents. Ids of later uploads continue after the
    /// largest seeded id.
    #[must_use]
    pub fn with_documents(self, documents: Vec<ApiDocument>) -> Self {
        let max_id = documents.iter().map(|d| d.id).max().unwrap_or(0);
        self.next_id.store(max_id + 1, Ordering::SeqCst);
        *self.documents.lock() = documents;
        self
    }

    /// Make health checks succeed or fail.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Script the result of the next `list_documents` call.
    pub fn push_list_result(&self, result: Result<Vec<ApiDocument>, Error>) {
        self.list_results.lock().push_back(result);
    }

    /// Script the result of the next `upload_document` call.
    pub fn push_upload_result(&self, result: Result<UploadResponse, Error>) {
        self.upload_results.lock().push_back(result);
    }

    /// Script the result of the next `ask_question` call.
    pub fn push_answer(&self, result: Result<AnswerResponse, Error>) {
        self.answers.lock().push_back(result);
    }

    /// Hold every upload until [`release_uploads`](Self::release_uploads).
    pub fn hold_uploads(&self) {
        self.upload_gate.closed.store(true, Ordering::SeqCst);
    }

    pub fn release_uploads(&self, n: usize) {
        self.upload_gate.permits.add_permits(n);
    }

    /// Hold every question until [`release_asks`](Self::release_asks).
    pub fn hold_asks(&self) {
        self.ask_gate.closed.store(true, Ordering::SeqCst);
    }

    pub fn release_asks(&self, n: usize) {
        self.ask_gate.permits.add_permits(n);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::ListDocuments))
    }

    pub fn upload_calls(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::Upload { .. }))
    }

    pub fn ask_calls(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::Ask { .. }))
    }

    pub fn health_calls(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::HealthCheck))
    }

    fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl DocumentApi for RecordingApi {
    async fn upload_document(&self, file: &UploadFile) -> Result<UploadResponse, Error> {
        self.record(ApiCall::Upload {
            filename: file.name.clone(),
        });
        self.upload_gate.pass().await;

        let scripted = self.upload_results.lock().pop_front();
        let response = match scripted {
            Some(result) => result?,
            None => UploadResponse {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                filename: file.name.clone(),
            },
        };
        self.documents.lock().push(ApiDocument {
            id: response.id,
            filename: response.filename.clone(),
            upload_date: Utc::now(),
        });
        Ok(response)
    }

    async fn list_documents(&self) -> Result<Vec<ApiDocument>, Error> {
        self.record(ApiCall::ListDocuments);
        tokio::task::yield_now().await;
        let scripted = self.list_results.lock().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(self.documents.lock().clone()),
        }
    }

    async fn ask_question(
        &self,
        document_id: i64,
        question: &str,
    ) -> Result<AnswerResponse, Error> {
        self.record(ApiCall::Ask {
            document_id,
            question: question.to_string(),
        });
        self.ask_gate.pass().await;

        let scripted = self.answers.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(AnswerResponse {
                answer: format!("answer to: {question}"),
            })
        })
    }

    async fn health_check(&self) -> bool {
        self.record(ApiCall::HealthCheck);
        tokio::task::yield_now().await;
        self.healthy.load(Ordering::SeqCst)
    }
}

/// A transport failure, as raised when the backend is unreachable.
pub fn unreachable(operation: Operation) -> Error {
    Error::Connection {
        operation,
        message: "Cannot connect to backend server at http://localhost:8000".into(),
    }
}

/// An error response carrying a backend detail.
pub fn api_error(operation: Operation, status: u16, detail: &str) -> Error {
    Error::Api {
        operation,
        status,
        detail: detail.to_string(),
    }
}

/// A listed document with the given backend timestamp.
///
/// # Panics
///
/// Panics if `date` is not a timestamp the backend could emit.
pub fn listed(id: i64, filename: &str, date: &str) -> ApiDocument {
    ApiDocument {
        id,
        filename: filename.to_string(),
        upload_date: docqa_core::api::parse_upload_date(date).expect("valid date"),
    }
}

/// A small in-memory PDF upload.
pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, b"%PDF-1.4\n%test\n".to_vec())
}

use async_trait::async_trait;
use docqa_core::{AnswerResponse, ApiDocument, UploadFile, UploadResponse};

use crate::{DocQaClient, Error};

/// The backend operations the session layer depends on.
///
/// [`DocQaClient`] is the HTTP implementation; tests substitute their own.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Upload a file for processing.
    async fn upload_document(&self, file: &UploadFile) -> Result<UploadResponse, Error>;

    /// List all fully processed documents.
    async fn list_documents(&self) -> Result<Vec<ApiDocument>, Error>;

    /// Ask a question about one document.
    async fn ask_question(&self, document_id: i64, question: &str)
    -> Result<AnswerResponse, Error>;

    /// Probe reachability. Never fails; any error is `false`.
    async fn health_check(&self) -> bool;
}

#[async_trait]
impl DocumentApi for DocQaClient {
    async fn upload_document(&self, file: &UploadFile) -> Result<UploadResponse, Error> {
        DocQaClient::upload_document(self, file).await
    }

    async fn list_documents(&self) -> Result<Vec<ApiDocument>, Error> {
        DocQaClient::list_documents(self).await
    }

    async fn ask_question(
        &self,
        document_id: i64,
        question: &str,
    ) -> Result<AnswerResponse, Error> {
        DocQaClient::ask_question(self, document_id, question).await
    }

    async fn health_check(&self) -> bool {
        DocQaClient::health_check(self).await
    }
}

use docqa_core::{ApiDocument, UploadFile, UploadResponse};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::{DocQaClient, Error, Operation};

impl DocQaClient {
    /// Upload a file as the multipart field `file`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), docqa_client::Error> {
    /// use docqa_client::DocQaClient;
    /// use docqa_core::UploadFile;
    ///
    /// let client = DocQaClient::new("http://localhost:8000");
    /// let file = UploadFile::from_path("paper.pdf").await.unwrap();
    /// let stored = client.upload_document(&file).await?;
    /// println!("stored as {}", stored.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_document(&self, file: &UploadFile) -> Result<UploadResponse, Error> {
        let operation = Operation::Upload;
        let url = self.url("/upload/");

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                Error::Configuration(format!("invalid content type {content_type}: {e}"))
            })?;
        }
        let form = Form::new().part("file", part);

        debug!(filename = %file.name, bytes = file.len(), "uploading document");
        let response = self
            .send(operation, self.client.post(&url).multipart(form))
            .await?;
        Self::decode(operation, response).await
    }

    /// List all documents the backend has finished processing.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), docqa_client::Error> {
    /// use docqa_client::DocQaClient;
    ///
    /// let client = DocQaClient::new("http://localhost:8000");
    /// for doc in client.list_documents().await? {
    ///     println!("{}: {}", doc.id, doc.filename);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_documents(&self) -> Result<Vec<ApiDocument>, Error> {
        let operation = Operation::ListDocuments;
        let url = self.url("/documents/");

        let response = self.send(operation, self.client.get(&url)).await?;
        Self::decode(operation, response).await
    }
}

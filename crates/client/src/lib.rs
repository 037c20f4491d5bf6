//! DocQA HTTP Client
//!
//! A native Rust client for the document question-answering backend's REST API.
//!
//! # Quick Start
//!
//! ```no_run
//! use docqa_client::DocQaClient;
//! use docqa_core::UploadFile;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docqa_client::Error> {
//!     let client = DocQaClient::new("http://localhost:8000");
//!
//!     if !client.health_check().await {
//!         eprintln!("backend is not reachable");
//!         return Ok(());
//!     }
//!
//!     let file = UploadFile::new("paper.pdf", std::fs::read("paper.pdf").unwrap());
//!     let uploaded = client.upload_document(&file).await?;
//!
//!     let answer = client
//!         .ask_question(uploaded.id, "What is the main finding?")
//!         .await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```no_run
//! use docqa_client::DocQaClientBuilder;
//! use std::time::Duration;
//!
//! let client = DocQaClientBuilder::new("http://localhost:8000")
//!     .timeout(Duration::from_secs(120))
//!     .build()
//!     .unwrap();
//! ```

mod api;
mod ask;
mod documents;
mod error;
#[cfg(test)]
mod mock;

pub use api::DocumentApi;
pub use error::{Error, Operation};

use std::time::Duration;

use docqa_core::ErrorBody;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path prefix under which the backend mounts its routes.
const API_PREFIX: &str = "/api";

/// HTTP client for the document backend.
#[derive(Debug, Clone)]
pub struct DocQaClient {
    client: Client,
    base_url: String,
}

/// Builder for configuring a [`DocQaClient`].
#[derive(Debug)]
pub struct DocQaClientBuilder {
    base_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl DocQaClientBuilder {
    /// Create a new builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DocQaClient, Error> {
        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };

        Ok(DocQaClient {
            client,
            base_url: self.base_url,
        })
    }
}

impl DocQaClient {
    /// Create a new client with default configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docqa_client::DocQaClient;
    ///
    /// let client = DocQaClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        DocQaClientBuilder::new(base_url)
            .build()
            .expect("default client configuration should not fail")
    }

    /// Create a builder for advanced configuration.
    pub fn builder(base_url: impl Into<String>) -> DocQaClientBuilder {
        DocQaClientBuilder::new(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// Send a request, mapping transport failures to [`Error::Connection`].
    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<Response, Error> {
        request.send().await.map_err(|e| {
            debug!(%operation, error = %e, "backend unreachable");
            Error::Connection {
                operation,
                message: format!("Cannot connect to backend server at {}", self.base_url),
            }
        })
    }

    /// Decode a success body, or turn an error response into [`Error::Api`].
    async fn decode<T: DeserializeOwned>(
        operation: Operation,
        response: Response,
    ) -> Result<T, Error> {
        let status = response.status();
        debug!(%operation, status = status.as_u16(), "backend responded");

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| Error::Deserialization {
                    operation,
                    message: e.to_string(),
                });
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        Err(Error::Api {
            operation,
            status: status.as_u16(),
            detail: body
                .message()
                .unwrap_or(operation.fallback_message())
                .to_string(),
        })
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check whether the backend is reachable and serving.
    ///
    /// The backend has no dedicated health route; the document listing is
    /// reused and only its status is inspected. Never fails: transport
    /// errors and non-success statuses both yield `false`.
    pub async fn health_check(&self) -> bool {
        let url = self.url("/documents/");
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockServer;

    #[test]
    fn builder_trims_trailing_slash() {
        let client = DocQaClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/ask/"), "http://localhost:8000/api/ask/");
    }

    #[tokio::test]
    async fn health_check_true_on_success() {
        let server = MockServer::start().await;
        let client = DocQaClient::new(&server.base_url);

        let handle = tokio::spawn(server.respond_once(200, "[]"));
        assert!(client.health_check().await);

        let request = handle.await.unwrap();
        assert!(request.starts_with("GET /api/documents/ "));
    }

    #[tokio::test]
    async fn health_check_false_on_server_error() {
        let server = MockServer::start().await;
        let client = DocQaClient::new(&server.base_url);

        let handle = tokio::spawn(server.respond_once(500, r#"{"detail":"db down"}"#));
        assert!(!client.health_check().await);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn health_check_false_when_unreachable() {
        let client = DocQaClient::new(MockServer::unreachable_url().await);
        assert!(!client.health_check().await);
    }
}

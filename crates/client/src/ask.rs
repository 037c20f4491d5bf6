use docqa_core::{AnswerResponse, AskRequest};
use tracing::debug;

use crate::{DocQaClient, Error, Operation};

impl DocQaClient {
    /// Ask a question about a stored document.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), docqa_client::Error> {
    /// use docqa_client::DocQaClient;
    ///
    /// let client = DocQaClient::new("http://localhost:8000");
    /// let answer = client.ask_question(1, "Who wrote this?").await?;
    /// println!("{}", answer.answer);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn ask_question(
        &self,
        document_id: i64,
        question: &str,
    ) -> Result<AnswerResponse, Error> {
        let operation = Operation::Ask;
        let url = self.url("/ask/");
        let body = AskRequest {
            document_id,
            question: question.to_string(),
        };

        debug!(document_id, "asking question");
        let response = self
            .send(operation, self.client.post(&url).json(&body))
            .await?;
        Self::decode(operation, response).await
    }
}

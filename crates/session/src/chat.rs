//! Question/answer history for the selected document.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docqa_client::{DocumentApi, Error};
use docqa_core::{AnswerResponse, ChatMessage, Document, ErrorKind, Notification};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::documents::SelectionObserver;

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The backend is not known to be reachable.
    Disconnected,
    NoDocument,
    DocumentNotReady,
    EmptyQuestion,
}

/// Result of [`ChatSession::submit`].
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Rejected locally; nothing was appended and no request was made.
    Skipped(SkipReason),
    /// Both messages were appended.
    Answered {
        question: ChatMessage,
        answer: ChatMessage,
    },
    /// The question and an error reply were appended.
    Failed {
        question: ChatMessage,
        reply: ChatMessage,
        error: Error,
        notification: Notification,
    },
    /// The session was reset while the request was in flight, so the
    /// response belongs to a discarded history and was not appended.
    Superseded {
        question: ChatMessage,
        result: Result<AnswerResponse, Error>,
    },
}

impl SubmitOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Failed { notification, .. } => Some(notification),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed { error, .. }
            | Self::Superseded {
                result: Err(error), ..
            } => Some(error),
            _ => None,
        }
    }

    /// How the submission failed, if it did.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Skipped(_) => Some(ErrorKind::ValidationSkip),
            _ => self.error().map(Error::kind),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    messages: Vec<ChatMessage>,
    /// Bumped by every reset; submissions only append within their own.
    generation: u64,
}

/// Holds `loading` up for exactly as long as a submission is in flight.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Ordered chat history scoped to one document.
pub struct ChatSession {
    api: Arc<dyn DocumentApi>,
    inner: Mutex<Inner>,
    in_flight: AtomicUsize,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("inner", &*self.inner.lock())
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    pub fn new(api: Arc<dyn DocumentApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Messages in the order they were appended.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.lock().messages.clone()
    }

    /// Whether any submission is awaiting its answer.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Drop the history. Answers still in flight will not be appended.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.messages.clear();
        inner.generation += 1;
        debug!(generation = inner.generation, "chat session reset");
    }

    /// Ask `question` about `document`.
    ///
    /// The user message is appended before the request goes out; the answer
    /// (or an error reply) is appended when it arrives, unless the session
    /// was reset in between.
    pub async fn submit(&self, question: &str, document: Option<&Document>) -> SubmitOutcome {
        let Some(document) = document else {
            return SubmitOutcome::Skipped(SkipReason::NoDocument);
        };
        let Some(document_id) = document.server_id().filter(|_| document.is_ready()) else {
            debug!(
                id = %document.id,
                status = %document.status,
                "document not ready for questions"
            );
            return SubmitOutcome::Skipped(SkipReason::DocumentNotReady);
        };
        let question = question.trim();
        if question.is_empty() {
            return SubmitOutcome::Skipped(SkipReason::EmptyQuestion);
        }

        let user_message = ChatMessage::user(question);
        let generation = {
            let mut inner = self.inner.lock();
            inner.messages.push(user_message.clone());
            inner.generation
        };
        let _loading = InFlight::enter(&self.in_flight);

        debug!(document_id, "submitting question");
        let result = self.api.ask_question(document_id, question).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(document_id, "session reset while question was in flight");
            return SubmitOutcome::Superseded {
                question: user_message,
                result,
            };
        }

        match result {
            Ok(response) => {
                let answer = ChatMessage::assistant(response.answer);
                inner.messages.push(answer.clone());
                SubmitOutcome::Answered {
                    question: user_message,
                    answer,
                }
            }
            Err(error) => {
                warn!(document_id, error = %error, "question failed");
                let detail = error.user_message();
                let reply = ChatMessage::assistant(format!(
                    "Sorry, I encountered an error while processing your question: {detail}"
                ));
                inner.messages.push(reply.clone());
                SubmitOutcome::Failed {
                    question: user_message,
                    reply,
                    error,
                    notification: Notification::error("Question Failed", detail),
                }
            }
        }
    }
}

impl SelectionObserver for ChatSession {
    fn selection_changed(&self, _document: &Document) {
        self.reset();
    }
}

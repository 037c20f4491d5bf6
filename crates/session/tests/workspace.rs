//! End-to-end scenarios over a [`Workspace`] backed by [`RecordingApi`].

use std::sync::Arc;

use docqa_session::docqa_client::Operation;
use docqa_session::docqa_core::{ConnectionState, DocumentStatus, ErrorKind, Role, UploadFile};
use docqa_session::testing::{ApiCall, RecordingApi, api_error, listed, pdf, unreachable};
use docqa_session::{
    LoadOutcome, SessionConfig, SkipReason, SubmitOutcome, UploadOutcome, Workspace,
};

fn config() -> SessionConfig {
    SessionConfig::new("http://localhost:8000").with_max_upload_bytes(1024)
}

async fn connected(api: &Arc<RecordingApi>) -> Workspace {
    let ws = Workspace::new(api.clone(), &config());
    let report = ws.connect().await;
    assert_eq!(report.outcome, ConnectionState::Connected);
    ws
}

fn seeded() -> Arc<RecordingApi> {
    Arc::new(RecordingApi::new().with_documents(vec![
        listed(1, "a.pdf", "2024-01-01T00:00:00Z"),
        listed(2, "b.pdf", "2024-01-02T00:00:00Z"),
    ]))
}

#[tokio::test]
async fn failed_upload_marks_single_document_errored() {
    let api = Arc::new(RecordingApi::new());
    let ws = connected(&api).await;
    api.push_upload_result(Err(api_error(Operation::Upload, 500, "disk full")));

    let report = ws.upload(&pdf("report.pdf")).await;
    let UploadOutcome::Failed { document, .. } = &report.outcome else {
        panic!("expected failed upload, got {:?}", report.outcome);
    };
    assert!(document.is_placeholder());

    let docs = ws.store().documents();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, document.id);
    assert_eq!(docs[0].status, DocumentStatus::Error);

    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].title, "Upload Failed");
    assert_eq!(report.notifications[0].description, "disk full");
    // A backend error is not a connectivity problem.
    assert_eq!(ws.connection(), ConnectionState::Connected);
}

#[tokio::test]
async fn successful_upload_confirms_placeholder() {
    let api = Arc::new(RecordingApi::new());
    let ws = connected(&api).await;

    let report = ws.upload(&pdf("report.pdf")).await;
    let UploadOutcome::Uploaded { document, .. } = &report.outcome else {
        panic!("expected uploaded, got {:?}", report.outcome);
    };
    assert_eq!(document.id, "1");
    assert_eq!(document.status, DocumentStatus::Ready);
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].title, "Success");

    // The follow-up reload lists the same id in the same slot.
    assert_eq!(api.list_calls(), 2);
    let docs = ws.store().documents();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "1");
    assert_eq!(docs[0].status, DocumentStatus::Ready);
}

#[tokio::test]
async fn nothing_is_sent_while_disconnected() {
    let api = seeded();
    api.set_healthy(false);
    let ws = Workspace::new(api.clone(), &config());
    ws.connect().await;
    assert_eq!(ws.connection(), ConnectionState::Disconnected);

    let upload = ws.upload(&pdf("a.pdf")).await;
    assert!(matches!(upload.outcome, UploadOutcome::Skipped(_)));
    assert_eq!(upload.outcome.error_kind(), Some(ErrorKind::ValidationSkip));
    assert!(upload.notifications.is_empty());

    let ask = ws.ask("anyone?").await;
    assert!(matches!(
        ask.outcome,
        SubmitOutcome::Skipped(SkipReason::Disconnected)
    ));
    assert!(ask.notifications.is_empty());

    assert_eq!(api.upload_calls(), 0);
    assert_eq!(api.ask_calls(), 0);
    assert!(ws.store().documents().is_empty());
    assert!(ws.chat().messages().is_empty());
}

#[tokio::test]
async fn selecting_always_clears_chat() {
    let api = seeded();
    let ws = connected(&api).await;

    ws.ask("first?").await;
    assert_eq!(ws.chat().messages().len(), 2);

    let current = ws.store().selected().unwrap();
    ws.select(&current.id).unwrap();
    assert!(ws.chat().messages().is_empty());

    ws.ask("second?").await;
    ws.select("2").unwrap();
    assert!(ws.chat().messages().is_empty());
}

#[tokio::test]
async fn blank_questions_send_nothing() {
    let api = seeded();
    let ws = connected(&api).await;

    for question in ["", "  "] {
        let report = ws.ask(question).await;
        assert!(matches!(
            report.outcome,
            SubmitOutcome::Skipped(SkipReason::EmptyQuestion)
        ));
    }
    assert!(ws.chat().messages().is_empty());
    assert_eq!(api.ask_calls(), 0);
}

#[tokio::test]
async fn questions_need_a_ready_selection() {
    let api = Arc::new(RecordingApi::new());
    let ws = connected(&api).await;

    let report = ws.ask("anyone there?").await;
    assert!(matches!(
        report.outcome,
        SubmitOutcome::Skipped(SkipReason::NoDocument)
    ));
    assert!(ws.chat().messages().is_empty());
    assert_eq!(api.ask_calls(), 0);
}

#[tokio::test]
async fn answered_question_appends_pair() {
    let api = seeded();
    let ws = connected(&api).await;

    let report = ws.ask("What is in a.pdf?").await;
    assert!(matches!(report.outcome, SubmitOutcome::Answered { .. }));
    assert!(report.notifications.is_empty());

    let messages = ws.chat().messages();
    let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::User, Role::Assistant]);
    assert_eq!(
        api.calls().last(),
        Some(&ApiCall::Ask {
            document_id: 1,
            question: "What is in a.pdf?".into()
        })
    );
}

#[tokio::test]
async fn listing_maps_and_auto_selects() {
    let api = Arc::new(
        RecordingApi::new().with_documents(vec![listed(1, "a.pdf", "2024-01-01T00:00:00Z")]),
    );
    let ws = connected(&api).await;

    let docs = ws.store().documents();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].name, "a.pdf");
    assert_eq!(docs[0].status, DocumentStatus::Ready);
    assert_eq!(docs[0].upload_date.to_string(), "2024-01-01");
    assert_eq!(ws.store().selected(), Some(docs[0].clone()));
}

#[tokio::test]
async fn backend_detail_lands_in_reply() {
    let api = seeded();
    let ws = connected(&api).await;
    api.push_answer(Err(api_error(Operation::Ask, 429, "quota exceeded")));

    let report = ws.ask("Why?").await;
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].description, "quota exceeded");

    let messages = ws.chat().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert!(messages[1].content.contains("quota exceeded"));
    assert!(!ws.chat().is_loading());
}

#[tokio::test]
async fn unreachable_backend_never_loads() {
    let api = seeded();
    api.set_healthy(false);
    let ws = Workspace::new(api.clone(), &config());

    let report = ws.connect().await;
    assert_eq!(report.outcome, ConnectionState::Disconnected);
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].title, "Backend Connection Failed");
    assert_eq!(api.list_calls(), 0);
    assert!(ws.store().documents().is_empty());

    // Refreshing while disconnected does not reach the backend either.
    let report = ws.refresh().await;
    assert_eq!(report.outcome, Some(LoadOutcome::Skipped));
    assert_eq!(api.list_calls(), 0);

    api.set_healthy(true);
    let report = ws.retry().await;
    assert_eq!(report.outcome, ConnectionState::Connected);
    assert_eq!(api.list_calls(), 1);
    assert_eq!(ws.store().documents().len(), 2);
}

#[tokio::test]
async fn invalid_uploads_are_skipped_locally() {
    let api = Arc::new(RecordingApi::new());
    let ws = connected(&api).await;

    let not_pdf = UploadFile::new("notes.txt", b"hello".to_vec());
    let oversized = UploadFile::new("big.pdf", vec![0; 2048]);
    for file in [not_pdf, oversized] {
        let report = ws.upload(&file).await;
        assert!(matches!(report.outcome, UploadOutcome::Skipped(_)));
        assert!(report.notifications.is_empty());
    }
    assert!(ws.store().documents().is_empty());
    assert_eq!(api.upload_calls(), 0);
}

#[tokio::test]
async fn answer_after_switch_is_dropped() {
    let api = seeded();
    let ws = connected(&api).await;
    api.hold_asks();

    let (report, ()) = tokio::join!(ws.ask("about a?"), async {
        while api.ask_calls() == 0 {
            tokio::task::yield_now().await;
        }
        ws.select("2").unwrap();
        api.release_asks(1);
    });

    assert!(matches!(report.outcome, SubmitOutcome::Superseded { .. }));
    assert!(ws.chat().messages().is_empty());
    assert!(!ws.chat().is_loading());
    assert_eq!(ws.store().selected().map(|d| d.id), Some("2".to_string()));
}

#[tokio::test]
async fn failed_reload_changes_nothing() {
    let api = seeded();
    let ws = connected(&api).await;
    ws.select("2").unwrap();
    let before = ws.store().documents();

    api.push_list_result(Err(api_error(
        Operation::ListDocuments,
        500,
        "Failed to fetch documents",
    )));
    let report = ws.refresh().await;
    assert_eq!(report.outcome, None);
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].title, "Error");

    assert_eq!(ws.store().documents(), before);
    assert_eq!(ws.store().selected().map(|d| d.id), Some("2".to_string()));
    assert_eq!(ws.connection(), ConnectionState::Connected);
}

#[tokio::test]
async fn transport_failure_on_upload_demotes_once() {
    let api = Arc::new(RecordingApi::new());
    let ws = connected(&api).await;
    api.push_upload_result(Err(unreachable(Operation::Upload)));

    let first = ws.upload(&pdf("a.pdf")).await;
    assert_eq!(
        first.outcome.error_kind(),
        Some(ErrorKind::TransportUnreachable)
    );
    assert_eq!(first.notifications.len(), 2);
    assert_eq!(first.notifications[1].title, "Backend Connection Failed");
    assert_eq!(ws.connection(), ConnectionState::Disconnected);

    // Demoted, so the next upload never leaves the client.
    let second = ws.upload(&pdf("b.pdf")).await;
    assert!(matches!(second.outcome, UploadOutcome::Skipped(_)));
    assert!(second.notifications.is_empty());
    assert_eq!(api.upload_calls(), 1);
}

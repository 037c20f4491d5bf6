use docqa_core::{ChatMessage, ConnectionState, UploadFile};
use docqa_session::{SkipReason, SubmitOutcome, UploadOutcome, Workspace};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{document_line, notify};
use crate::OutputFormat;

const HELP: &str =
    "Commands: /docs, /select <id>, /upload <path>, /retry, /quit. Anything else is a question.";

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Docs,
    Select(&'a str),
    Upload(&'a str),
    Retry,
    Quit,
    Help,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse(line: &str) -> Input<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Question(line);
    };
    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));
    match name {
        "docs" => Input::Docs,
        "select" if !arg.is_empty() => Input::Select(arg),
        "upload" if !arg.is_empty() => Input::Upload(arg),
        "retry" => Input::Retry,
        "quit" | "exit" => Input::Quit,
        "help" => Input::Help,
        _ => Input::Unknown(line),
    }
}

pub async fn run(workspace: &Workspace, format: &OutputFormat) -> anyhow::Result<()> {
    let report = workspace.connect().await;
    notify(&report.notifications);
    if report.outcome != ConnectionState::Connected {
        eprintln!("Use /retry once the backend is running.");
    }
    print_selection(workspace);
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse(&line) {
            Input::Quit => break,
            Input::Help => eprintln!("{HELP}"),
            Input::Unknown(line) => eprintln!("Unknown command: {line}. {HELP}"),
            Input::Docs => print_documents(workspace),
            Input::Retry => {
                let report = workspace.retry().await;
                notify(&report.notifications);
                eprintln!("Backend: {}", report.outcome);
            }
            Input::Select(id) => match workspace.select(id) {
                Some(doc) => eprintln!("Now chatting about {}.", doc.name),
                None => eprintln!("Document {id} is not ready or does not exist."),
            },
            Input::Upload(path) => upload(workspace, path).await,
            Input::Question(question) => ask(workspace, question, format).await?,
        }
    }
    Ok(())
}

fn print_selection(workspace: &Workspace) {
    match workspace.store().selected() {
        Some(doc) => eprintln!("Chatting about {} ({}).", doc.name, doc.id),
        None => eprintln!("No document selected. Upload one with /upload <path>."),
    }
}

fn print_documents(workspace: &Workspace) {
    let selected = workspace.store().selected().map(|d| d.id);
    let documents = workspace.store().documents();
    if documents.is_empty() {
        eprintln!("No documents.");
    }
    for doc in &documents {
        eprintln!("{}", document_line(doc, selected.as_deref() == Some(doc.id.as_str())));
    }
}

async fn upload(workspace: &Workspace, path: &str) {
    let file = match UploadFile::from_path(path).await {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: failed to read {path}: {e}");
            return;
        }
    };
    let report = workspace.upload(&file).await;
    notify(&report.notifications);
    if let UploadOutcome::Skipped(reason) = &report.outcome {
        eprintln!("Skipped: {reason}");
    }
    if report.outcome.document().is_some() && workspace.store().selected().is_some() {
        print_selection(workspace);
    }
}

async fn ask(workspace: &Workspace, question: &str, format: &OutputFormat) -> anyhow::Result<()> {
    let report = workspace.ask(question).await;
    notify(&report.notifications);
    match report.outcome {
        SubmitOutcome::Answered { answer, .. } => print_message(&answer, format)?,
        SubmitOutcome::Failed { reply, .. } => print_message(&reply, format)?,
        SubmitOutcome::Skipped(SkipReason::EmptyQuestion) => {}
        SubmitOutcome::Skipped(SkipReason::Disconnected) => {
            eprintln!("The backend is not connected. Use /retry.");
        }
        SubmitOutcome::Skipped(SkipReason::NoDocument) => {
            eprintln!("Select a document first with /select <id>.");
        }
        SubmitOutcome::Skipped(SkipReason::DocumentNotReady) => {
            eprintln!("The selected document is not ready yet.");
        }
        SubmitOutcome::Superseded { .. } => {}
    }
    Ok(())
}

fn print_message(message: &ChatMessage, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(message)?),
        OutputFormat::Text => println!("{}", message.content),
    }
    Ok(())
}

pub mod ask;
pub mod chat;
pub mod documents;
pub mod health;
pub mod upload;

use docqa_core::{ConnectionState, Document, Notification};
use docqa_session::Workspace;

/// Write notifications to stderr, keeping stdout for results.
pub fn notify(notifications: &[Notification]) {
    for n in notifications {
        if n.is_error() {
            eprintln!("error: {n}");
        } else {
            eprintln!("{n}");
        }
    }
}

/// Probe the backend and load documents, failing if it is unreachable.
pub async fn connect(workspace: &Workspace) -> anyhow::Result<()> {
    let report = workspace.connect().await;
    notify(&report.notifications);
    if report.outcome != ConnectionState::Connected {
        anyhow::bail!("backend is not reachable");
    }
    Ok(())
}

pub fn document_line(doc: &Document, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    format!(
        "{marker} {id:<12} {status:<10} {date} {size:>8}  {name}",
        id = doc.id,
        status = doc.status,
        date = doc.upload_date,
        size = doc.size,
        name = doc.name,
    )
}

use docqa_session::Workspace;

use super::{connect, document_line};
use crate::OutputFormat;

pub async fn run(workspace: &Workspace, format: &OutputFormat) -> anyhow::Result<()> {
    connect(workspace).await?;
    let documents = workspace.store().documents();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        OutputFormat::Text => {
            if documents.is_empty() {
                println!("No documents uploaded yet.");
                return Ok(());
            }
            println!("{} documents:", documents.len());
            for doc in &documents {
                println!("{}", document_line(doc, false));
            }
        }
    }
    Ok(())
}

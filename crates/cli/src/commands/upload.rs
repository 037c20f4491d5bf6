use std::path::Path;

use anyhow::Context;
use docqa_core::UploadFile;
use docqa_session::{UploadOutcome, Workspace};

use super::{connect, notify};
use crate::OutputFormat;

pub async fn run(workspace: &Workspace, path: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    connect(workspace).await?;
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let report = workspace.upload(&file).await;
    notify(&report.notifications);
    match report.outcome {
        UploadOutcome::Skipped(reason) => anyhow::bail!("{reason}"),
        UploadOutcome::Failed { error, .. } => Err(error.into()),
        UploadOutcome::Uploaded { document, .. } => {
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
                OutputFormat::Text => {
                    println!("Uploaded {} as document {}.", document.name, document.id);
                }
            }
            Ok(())
        }
    }
}

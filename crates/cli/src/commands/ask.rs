use clap::Args;
use docqa_session::{SubmitOutcome, Workspace};

use super::{connect, notify};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Id of the document to ask about.
    #[arg(long, short)]
    pub document: String,
    /// The question.
    pub question: String,
}

pub async fn run(
    workspace: &Workspace,
    args: &AskArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    connect(workspace).await?;
    if workspace.select(&args.document).is_none() {
        anyhow::bail!("document {} is not available", args.document);
    }

    let report = workspace.ask(&args.question).await;
    notify(&report.notifications);
    match report.outcome {
        SubmitOutcome::Answered { question, answer } => {
            match format {
                OutputFormat::Json => {
                    let body = serde_json::json!({ "question": question, "answer": answer });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                OutputFormat::Text => println!("{}", answer.content),
            }
            Ok(())
        }
        SubmitOutcome::Failed { error, .. } => Err(error.into()),
        SubmitOutcome::Skipped(reason) => anyhow::bail!("question not sent: {reason:?}"),
        SubmitOutcome::Superseded { .. } => {
            anyhow::bail!("session was reset before the answer arrived")
        }
    }
}

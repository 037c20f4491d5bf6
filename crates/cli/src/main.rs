//! DocQA CLI
//!
//! Upload PDFs to a document question-answering backend and ask questions
//! about them, one-shot or from an interactive chat.

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use docqa_session::{DEFAULT_ENDPOINT, SessionConfig, Workspace};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Ask questions about your documents.
#[derive(Parser, Debug)]
#[command(name = "docqa", version, about)]
struct Cli {
    /// Backend endpoint URL.
    #[arg(long, env = "DOCQA_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Request timeout in seconds.
    #[arg(long, env = "DOCQA_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend is reachable.
    Health,
    /// List uploaded documents.
    Documents,
    /// Upload a PDF.
    Upload {
        /// Path to the file.
        path: PathBuf,
    },
    /// Ask a single question about a document.
    Ask(commands::ask::AskArgs),
    /// Start an interactive chat.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = SessionConfig::from_env();
    config.endpoint.clone_from(&cli.endpoint);
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    debug!(endpoint = %config.endpoint, timeout = ?config.timeout, "starting");
    let workspace = Workspace::from_config(&config)?;

    match cli.command {
        Command::Health => commands::health::run(&workspace, &config, &cli.format).await,
        Command::Documents => commands::documents::run(&workspace, &cli.format).await,
        Command::Upload { path } => commands::upload::run(&workspace, &path, &cli.format).await,
        Command::Ask(args) => commands::ask::run(&workspace, &args, &cli.format).await,
        Command::Chat => commands::chat::run(&workspace, &cli.format).await,
    }
}

use docqa_session::{ConnectionEvent, SessionConfig, Workspace};

use crate::OutputFormat;

pub async fn run(
    workspace: &Workspace,
    config: &SessionConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let event = workspace.monitor().probe().await;
    let state = workspace.connection();

    if let OutputFormat::Json = format {
        let body = serde_json::json!({ "endpoint": config.endpoint, "state": state });
        println!("{}", serde_json::to_string_pretty(&body)?);
    }

    match event {
        Some(ConnectionEvent::Established) => {
            if let OutputFormat::Text = format {
                println!("Backend at {} is reachable.", config.endpoint);
            }
            Ok(())
        }
        Some(ConnectionEvent::Lost(notification)) => {
            eprintln!("{notification}");
            std::process::exit(1);
        }
        None => {
            eprintln!("Backend state: {state}");
            std::process::exit(1);
        }
    }
}

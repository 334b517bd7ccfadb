use super::error;
use super::output;
use super::Commands;
use crate::app::state::AppState;
use crate::extract::{fetch_and_extract, page_client};
use crate::server::{submit, ServerClient, SubmitError, SubmitOptions};
use anyhow::Result;
use fluent::fluent_args;

/// Handle a CLI command and return exit code
pub async fn handle_command(command: Commands, state: AppState) -> i32 {
    let result = match command {
        Commands::Status => handle_status(&state).await,
        Commands::Queue { json } => handle_queue(&state, json).await,
        Commands::Grab {
            page_url,
            quality,
            format,
        } => handle_grab(&state, page_url, quality, format).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            error::ERROR
        }
    }
}

/// One health probe, exit code says whether the server answered
async fn handle_status(state: &AppState) -> Result<i32> {
    let config = state.config_snapshot().await;
    let client = ServerClient::new(&config.server)?;

    if client.is_healthy().await {
        println!("{}", state.t("status-connected"));
        Ok(error::SUCCESS)
    } else {
        println!("{}", state.t("status-disconnected"));
        Ok(error::ERROR)
    }
}

/// Print the server queue
async fn handle_queue(state: &AppState, json: bool) -> Result<i32> {
    let config = state.config_snapshot().await;
    let client = ServerClient::new(&config.server)?;

    let items = client.fetch_queue().await?;
    println!("{}", output::format_queue(&items, json));

    Ok(error::SUCCESS)
}

/// Headless extract-and-submit for one page
async fn handle_grab(
    state: &AppState,
    page_url: String,
    quality: Option<String>,
    format: Option<String>,
) -> Result<i32> {
    if url::Url::parse(&page_url).is_err() {
        eprintln!("Invalid page URL: {}", page_url);
        return Ok(error::INVALID_INPUT);
    }

    let config = state.config_snapshot().await;
    let client = ServerClient::new(&config.server)?;

    let page = page_client()?;
    let info = fetch_and_extract(&page, &page_url).await;
    println!("{}: {}", state.t("video-info"), info.title);

    let options = SubmitOptions {
        quality: quality.unwrap_or_else(|| "best".to_string()),
        format: format.unwrap_or_else(|| "mp4".to_string()),
        output_folder: config.download.folder.clone(),
    };

    match submit(&client, Some(&info), &options).await {
        Ok(outcome) => {
            let id_text = outcome
                .id
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string());
            let args = fluent_args! { "id" => id_text };
            println!("{}", state.t_with_args("download-added", Some(&args)));
            Ok(error::SUCCESS)
        }
        Err(SubmitError::AlreadyQueued) => {
            println!("{}", state.t("already-in-queue"));
            Ok(error::ALREADY_QUEUED)
        }
        Err(SubmitError::Rejected { message }) => {
            eprintln!(
                "{}",
                message.unwrap_or_else(|| state.t("download-failed"))
            );
            Ok(error::ERROR)
        }
        Err(SubmitError::Network(e)) => {
            eprintln!("{}: {}", state.t("server-not-running"), e);
            Ok(error::ERROR)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(error::ERROR)
        }
    }
}

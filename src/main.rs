use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use vda::{
    app::{config::Config, state::AppState},
    bridge::{spawn_relay, MessageBridge},
    cli::{self, Cli},
    extract::PageWatcher,
    server::ConnectivityPoller,
    tui::run_tui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first to get verbose flag
    let cli = Cli::parse();

    // Get logs directory (creates if needed)
    let logs_dir = vda::util::paths::get_logs_dir().unwrap_or_else(|_| PathBuf::from("."));
    std::fs::create_dir_all(&logs_dir).ok();

    // Set up daily rotating file appender (YYYYMMDD.jsonl format)
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "vda.jsonl");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Set log level based on verbose flag
    let log_level = if cli.verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    // Initialize logging with JSON format for structured logs
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::from_level(
                    log_level,
                )),
        )
        .init();

    tracing::info!("Starting Video Download Assistant...");
    if cli.verbose {
        tracing::info!("Verbose logging enabled (TRACE level)");
    }
    tracing::trace!("CLI arguments: {:?}", cli);

    // Set config directory override if --config flag was used
    if let Some(ref config_dir) = cli.config {
        tracing::info!("Using config directory override: {:?}", config_dir);
        vda::util::paths::set_config_dir_override(Some(config_dir.clone()));
    }

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {:#}. Using defaults", e);
        Config::default()
    });
    tracing::info!("Config loaded: {:?}", config);

    let state = AppState::new(config.clone());

    // Route based on CLI arguments
    match cli.command {
        Some(command) => {
            // CLI mode - handle command and exit
            let exit_code = cli::handler::handle_command(command, state).await;

            std::process::exit(exit_code);
        }
        None => {
            // TUI mode (default)
            let bridge = MessageBridge::new();
            spawn_relay(bridge.clone());

            // Handle kept alive for the whole session; dropping it would
            // stop the watcher task
            let (_watcher_handle, _watcher_task) =
                PageWatcher::spawn(bridge.clone(), cli.page_url.clone())?;

            let mut poller = ConnectivityPoller::new();
            poller.start(&config.server)?;

            run_tui(state, bridge, poller, cli.page_url).await?;
        }
    }

    Ok(())
}

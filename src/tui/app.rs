use super::events::TuiEvent;
use super::keymap::{self, KeyAction};
use super::state::{MainControl, QueueState, SettingsField, SubmitState, ToolStatus, TuiState, View};
use crate::app::config;
use crate::app::state::AppState;
use crate::bridge::{BusEvent, MessageBridge, Surface, REQUEST_TIMEOUT};
use crate::extract::VideoInfo;
use crate::server::{submit, ConnectivityPoller, ServerClient, SubmitError, SubmitOptions};
use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Maximum length accepted into a settings text field
const MAX_INPUT_LENGTH: usize = 256;

/// Main TUI application
///
/// Owns the poller handle so a saved server change can restart it, and a
/// clone of the event sender so spawned operations can report back.
pub struct TuiApp {
    pub state: TuiState,
    pub bridge: MessageBridge,
    pub poller: ConnectivityPoller,
    pub should_quit: bool,
    /// Page URL given on the command line; used to synthesize a fallback
    /// record when the watcher cannot answer
    initial_url: Option<String>,
    events_tx: mpsc::Sender<TuiEvent>,
}

impl TuiApp {
    pub fn new(
        app_state: AppState,
        bridge: MessageBridge,
        poller: ConnectivityPoller,
        initial_url: Option<String>,
        events_tx: mpsc::Sender<TuiEvent>,
    ) -> Self {
        Self {
            state: TuiState::new(app_state),
            bridge,
            poller,
            should_quit: false,
            initial_url,
            events_tx,
        }
    }

    /// Handle a TUI event
    pub async fn handle_event(&mut self, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Tick => {
                if matches!(self.state.submit, SubmitState::InFlight) {
                    self.state.advance_spinner();
                    self.state.mark_dirty();
                }
            }
            TuiEvent::Input(input) => {
                self.handle_input(input).await?;
                self.state.mark_dirty();
            }
            TuiEvent::Bus(BusEvent::VideoInfoReceived(info)) => {
                self.state.set_video_info(info);
            }
            // The relay turns these into VideoInfoReceived for us
            TuiEvent::Bus(BusEvent::VideoInfoUpdated(_)) => {}
            TuiEvent::VideoInfoPulled(Some(info)) => {
                self.state.set_video_info(info);
            }
            TuiEvent::VideoInfoPulled(None) => {
                // Watcher had nothing; degrade to a record built from the
                // entered URL rather than an empty main view
                if self.state.video_info.is_none() {
                    if let Some(url) = &self.initial_url {
                        self.state.set_video_info(VideoInfo::fallback(url));
                    }
                }
            }
            TuiEvent::Connection(connection) => {
                self.state.connection = connection;
                self.state.mark_dirty();
            }
            TuiEvent::SubmitFinished(result) => self.finish_submit(result),
            TuiEvent::QueueLoaded(result) => self.finish_queue_load(result),
            TuiEvent::ToolCheckFinished(result) => self.finish_tool_check(result),
        }
        Ok(())
    }

    /// Handle keyboard input
    async fn handle_input(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) => {
                // Only process key press events, ignore release and repeat
                if kind != KeyEventKind::Press {
                    return Ok(());
                }
                self.state.status_message = None;

                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    self.should_quit = true;
                    return Ok(());
                }

                if self.state.editing {
                    self.handle_edit_key(code);
                    return Ok(());
                }

                if let Some(action) = keymap::resolve(self.state.view, code) {
                    self.dispatch(action).await?;
                }
            }
            Event::Paste(text) => {
                if self.state.editing {
                    let available =
                        MAX_INPUT_LENGTH.saturating_sub(self.state.edit_buffer.chars().count());
                    self.state
                        .edit_buffer
                        .extend(text.chars().filter(|c| !c.is_control()).take(available));
                }
            }
            // Redraw happens unconditionally after input
            Event::Resize(_, _) => {}
            _ => {}
        }
        Ok(())
    }

    /// Act on one resolved key action
    async fn dispatch(&mut self, action: KeyAction) -> Result<()> {
        match (self.state.view, action) {
            (_, KeyAction::Quit) => self.should_quit = true,

            (View::Main, KeyAction::OpenSettings) => self.open_settings().await,
            (View::Main, KeyAction::OpenQueue) => self.open_queue().await,
            (View::Main, KeyAction::Refresh) => self.spawn_video_pull(),
            (View::Main, KeyAction::FocusNext) => self.state.focus_next_control(),
            (View::Main, KeyAction::FocusPrev) => self.state.focus_prev_control(),
            (View::Main, KeyAction::CycleLeft) => self.cycle_main(-1),
            (View::Main, KeyAction::CycleRight) => self.cycle_main(1),
            (View::Main, KeyAction::Activate) => {
                if self.state.main_control == MainControl::DownloadButton {
                    self.start_submit().await;
                }
            }

            (View::Settings, KeyAction::Back) => self.state.show_main(),
            (View::Settings, KeyAction::FocusNext) => self.state.settings_field_down(),
            (View::Settings, KeyAction::FocusPrev) => self.state.settings_field_up(),
            (View::Settings, KeyAction::CycleLeft) => self.state.cycle_settings_value(-1),
            (View::Settings, KeyAction::CycleRight) => self.state.cycle_settings_value(1),
            (View::Settings, KeyAction::Activate) => {
                match self.state.focused_settings_field() {
                    SettingsField::SaveButton => self.save_settings().await,
                    SettingsField::Language => self.state.cycle_settings_value(1),
                    _ => self.state.begin_edit(),
                }
            }

            (View::Queue, KeyAction::Back) => self.state.show_main(),
            (View::Queue, KeyAction::Refresh) => self.open_queue().await,

            _ => {}
        }
        Ok(())
    }

    /// Keystrokes while a settings text field is being edited
    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.state.commit_edit(),
            KeyCode::Esc => self.state.cancel_edit(),
            KeyCode::Backspace => {
                self.state.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                if self.state.edit_buffer.chars().count() < MAX_INPUT_LENGTH {
                    self.state.edit_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    /// Left/Right on the main view cycles the focused selector
    fn cycle_main(&mut self, step: isize) {
        match self.state.main_control {
            MainControl::Quality => self.state.cycle_quality(step),
            MainControl::Format => self.state.cycle_format(step),
            MainControl::DownloadButton => {}
        }
    }

    /// Enter the settings view and fire the yt-dlp probe
    async fn open_settings(&mut self) {
        let config = self.state.app_state.config_snapshot().await;
        self.state.show_settings(&config);

        match ServerClient::new(&config.server) {
            Ok(client) => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = client.check_ytdlp().await;
                    let _ = tx.send(TuiEvent::ToolCheckFinished(result)).await;
                });
            }
            Err(e) => {
                tracing::error!("Failed to build server client: {:#}", e);
                self.state.tool_status = ToolStatus::Unreachable;
            }
        }
    }

    /// Enter (or refresh) the queue view and fire the fetch
    async fn open_queue(&mut self) {
        let config = self.state.app_state.config_snapshot().await;
        self.state.show_queue();

        match ServerClient::new(&config.server) {
            Ok(client) => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = client.fetch_queue().await;
                    let _ = tx.send(TuiEvent::QueueLoaded(result)).await;
                });
            }
            Err(e) => {
                tracing::error!("Failed to build server client: {:#}", e);
                self.state.queue = QueueState::Error;
            }
        }
    }

    /// Ask the watcher for its current record; the answer (or its absence)
    /// comes back as `VideoInfoPulled`
    fn spawn_video_pull(&self) {
        let bridge = self.bridge.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let pulled = match bridge.request_video_info(Surface::Page, REQUEST_TIMEOUT).await {
                Ok(info) => info,
                Err(e) => {
                    tracing::debug!("Video info pull failed: {}", e);
                    None
                }
            };
            let _ = tx.send(TuiEvent::VideoInfoPulled(pulled)).await;
        });
    }

    /// Kick off one submission; completion lands as `SubmitFinished`
    async fn start_submit(&mut self) {
        if !self.state.submit_allowed() {
            return;
        }
        if self.state.video_info.is_none() {
            // Nothing extracted; no request is made
            self.state.submit = SubmitState::Failed {
                message: self.state.t("no-video-selected"),
            };
            return;
        }

        let app_config = self.state.app_state.config_snapshot().await;
        let client = match ServerClient::new(&app_config.server) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to build server client: {:#}", e);
                self.state.submit = SubmitState::Failed {
                    message: self.state.t("server-not-running"),
                };
                return;
            }
        };

        let options = SubmitOptions {
            quality: self.state.quality().to_string(),
            format: self.state.format().to_string(),
            output_folder: app_config.download.folder.clone(),
        };
        let video_info = self.state.video_info.clone();
        self.state.submit = SubmitState::InFlight;
        self.state.spinner_frame = 0;

        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = submit(&client, video_info.as_ref(), &options).await;
            let _ = tx.send(TuiEvent::SubmitFinished(result)).await;
        });
    }

    /// Map a finished submission onto the one-shot control
    fn finish_submit(&mut self, result: Result<crate::server::SubmitOutcome, SubmitError>) {
        self.state.submit = match result {
            Ok(outcome) => SubmitState::Accepted { id: outcome.id },
            Err(SubmitError::NoVideoSelected) => SubmitState::Failed {
                message: self.state.t("no-video-selected"),
            },
            Err(SubmitError::AlreadyQueued) => SubmitState::Failed {
                message: self.state.t("already-in-queue"),
            },
            // Server-provided text wins over the generic message
            Err(SubmitError::Rejected { message }) => SubmitState::Failed {
                message: message.unwrap_or_else(|| self.state.t("download-failed")),
            },
            Err(SubmitError::Network(e)) => {
                tracing::warn!("Submission transport failure: {}", e);
                SubmitState::Failed {
                    message: self.state.t("server-not-running"),
                }
            }
        };
        self.state.mark_dirty();
    }

    fn finish_queue_load(
        &mut self,
        result: Result<Vec<crate::server::QueueItem>, reqwest::Error>,
    ) {
        self.state.queue = match result {
            Ok(items) => QueueState::Loaded(items),
            Err(e) => {
                tracing::warn!("Queue fetch failed: {}", e);
                QueueState::Error
            }
        };
        self.state.mark_dirty();
    }

    fn finish_tool_check(&mut self, result: Result<crate::server::ToolCheck, reqwest::Error>) {
        self.state.tool_status = match result {
            Ok(check) if check.installed => ToolStatus::Installed {
                version: check.version,
            },
            Ok(_) => ToolStatus::Missing,
            Err(e) => {
                tracing::warn!("yt-dlp probe failed: {}", e);
                ToolStatus::Unreachable
            }
        };
        self.state.mark_dirty();
    }

    /// Validate the form, persist it, and apply side effects
    ///
    /// A rejected value leaves the stored settings untouched and keeps the
    /// settings view open with a localized message.
    async fn save_settings(&mut self) {
        let host = self.state.form.host.trim().to_string();
        if host.is_empty() {
            self.state.validation_error = Some(self.state.t("invalid-host"));
            return;
        }
        let Some(port) = config::parse_port(&self.state.form.port) else {
            self.state.validation_error = Some(self.state.t("invalid-port"));
            return;
        };
        self.state.validation_error = None;

        let previous = self.state.app_state.config_snapshot().await;
        let mut updated = previous.clone();
        updated.general.language = self.state.form.language().to_string();
        updated.server.host = host;
        updated.server.port = port;
        updated.download.folder = self.state.form.folder.trim().to_string();

        if let Err(e) = updated.save() {
            tracing::error!("Failed to save settings: {:#}", e);
            self.state.validation_error = Some(self.state.t("settings-save-failed"));
            return;
        }

        *self.state.app_state.config.write().await = updated.clone();

        // Re-probe immediately so the badge reflects the new endpoint
        if updated.server != previous.server {
            if let Err(e) = self.poller.restart(&updated.server) {
                tracing::error!("Failed to restart connectivity poller: {:#}", e);
            }
        }
        if updated.general.language != previous.general.language {
            self.state.app_state.reload_language(&updated.general.language);
        }

        tracing::info!(
            "Settings saved (server {}:{}, language {})",
            updated.server.host,
            updated.server.port,
            updated.general.language
        );
        self.state.status_message = Some(self.state.t("settings-saved"));
        self.state.show_main();
    }
}

/// Main TUI entry point
pub async fn run_tui(
    app_state: AppState,
    bridge: MessageBridge,
    poller: ConnectivityPoller,
    initial_url: Option<String>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Event channel
    let (tx, mut rx) = mpsc::channel(100);

    let mut app = TuiApp::new(app_state, bridge, poller, initial_url, tx.clone());
    app.state.connection = app.poller.current();

    // Spawn keyboard event reader
    let input_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = crossterm::event::EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if input_tx.send(TuiEvent::Input(event)).await.is_err() {
                break;
            }
        }
    });

    // Spawn tick event generator
    let tick_tx = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tick_tx.send(TuiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    // Forward bridge broadcasts into the event channel
    let bus_tx = tx.clone();
    let mut bus_rx = app.bridge.subscribe();
    tokio::spawn(async move {
        loop {
            match bus_rx.recv().await {
                Ok(event) => {
                    if bus_tx.send(TuiEvent::Bus(event)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("UI bus subscriber lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Forward connectivity transitions into the event channel
    let conn_tx = tx.clone();
    let mut conn_rx = app.poller.subscribe();
    tokio::spawn(async move {
        while conn_rx.changed().await.is_ok() {
            let connection = *conn_rx.borrow_and_update();
            if conn_tx.send(TuiEvent::Connection(connection)).await.is_err() {
                break;
            }
        }
    });

    // Seed the main view with whatever the watcher already has
    app.spawn_video_pull();

    // Main event loop
    while !app.should_quit {
        // Draw UI only if dirty flag is set (optimization)
        if app.state.needs_redraw() {
            terminal.draw(|f| super::ui::render(&app, f))?;
            app.state.clear_dirty();
        }

        // Handle events with timeout
        if let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(100), rx.recv()).await
        {
            app.handle_event(event).await?;
        }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::Config;
    use crate::server::{QueueItem, SubmitOutcome, ToolCheck};
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app(config: Config) -> (TuiApp, mpsc::Receiver<TuiEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let app_state = AppState::new(config);
        let poller = ConnectivityPoller::with_interval(Duration::from_secs(60));
        let app = TuiApp::new(app_state, MessageBridge::new(), poller, None, tx);
        (app, rx)
    }

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.server.host = server.address().ip().to_string();
        config.server.port = server.address().port();
        config
    }

    fn sample_video() -> VideoInfo {
        VideoInfo::new(
            "https://video.example/watch?v=1".to_string(),
            "Sample".to_string(),
            String::new(),
        )
    }

    fn key(code: KeyCode) -> TuiEvent {
        TuiEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    async fn transport_error() -> reqwest::Error {
        ServerClient::from_base_url("http://127.0.0.1:1".to_string())
            .unwrap()
            .fetch_queue()
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_submission_reaches_accepted_state_with_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/queue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<QueueItem>::new()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "id": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (mut app, mut rx) = test_app(config_for(&server));
        app.state.set_video_info(sample_video());
        app.state.main_control = MainControl::DownloadButton;

        app.start_submit().await;
        assert_eq!(app.state.submit, SubmitState::InFlight);

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("submission did not finish")
            .expect("event channel closed");
        app.handle_event(event).await.unwrap();

        assert_eq!(app.state.submit, SubmitState::Accepted { id: Some(7) });
    }

    #[tokio::test]
    async fn test_submit_without_video_fails_without_any_request() {
        let (mut app, mut rx) = test_app(Config::default());
        app.start_submit().await;

        assert_eq!(
            app.state.submit,
            SubmitState::Failed {
                message: app.state.t("no-video-selected")
            }
        );
        // No task was spawned, so nothing can arrive
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rejected_submission_prefers_server_error_text() {
        let (mut app, _rx) = test_app(Config::default());

        app.finish_submit(Err(SubmitError::Rejected {
            message: Some("quota exceeded".to_string()),
        }));
        assert_eq!(
            app.state.submit,
            SubmitState::Failed {
                message: "quota exceeded".to_string()
            }
        );

        app.finish_submit(Err(SubmitError::Rejected { message: None }));
        assert_eq!(
            app.state.submit,
            SubmitState::Failed {
                message: app.state.t("download-failed")
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_and_network_failures_localize() {
        let (mut app, _rx) = test_app(Config::default());

        app.finish_submit(Err(SubmitError::AlreadyQueued));
        assert_eq!(
            app.state.submit,
            SubmitState::Failed {
                message: app.state.t("already-in-queue")
            }
        );
        assert!(app.state.submit_allowed());

        app.finish_submit(Err(SubmitError::Network(transport_error().await)));
        assert_eq!(
            app.state.submit,
            SubmitState::Failed {
                message: app.state.t("server-not-running")
            }
        );
    }

    #[tokio::test]
    async fn test_submission_outcome_keeps_missing_id() {
        let (mut app, _rx) = test_app(Config::default());
        app.finish_submit(Ok(SubmitOutcome { id: None }));
        assert_eq!(app.state.submit, SubmitState::Accepted { id: None });
    }

    #[tokio::test]
    async fn test_tool_check_results_map_to_indicator() {
        let (mut app, _rx) = test_app(Config::default());

        app.finish_tool_check(Ok(ToolCheck {
            installed: true,
            version: Some("2025.08.11".to_string()),
        }));
        assert_eq!(
            app.state.tool_status,
            ToolStatus::Installed {
                version: Some("2025.08.11".to_string())
            }
        );

        app.finish_tool_check(Ok(ToolCheck {
            installed: false,
            version: None,
        }));
        assert_eq!(app.state.tool_status, ToolStatus::Missing);

        app.finish_tool_check(Err(transport_error().await));
        assert_eq!(app.state.tool_status, ToolStatus::Unreachable);
    }

    #[tokio::test]
    async fn test_queue_load_results_map_to_view_state() {
        let (mut app, _rx) = test_app(Config::default());

        let items = vec![QueueItem {
            id: 3,
            title: None,
            url: "https://video.example/watch?v=3".to_string(),
            quality: "best".to_string(),
            format_selector: "mp4".to_string(),
        }];
        app.finish_queue_load(Ok(items.clone()));
        assert_eq!(app.state.queue, QueueState::Loaded(items));

        app.finish_queue_load(Err(transport_error().await));
        assert_eq!(app.state.queue, QueueState::Error);
    }

    #[tokio::test]
    async fn test_keyboard_walks_between_views() {
        let (mut app, _rx) = test_app(Config::default());
        assert_eq!(app.state.view, View::Main);

        app.handle_event(key(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(app.state.view, View::Settings);

        app.handle_event(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state.view, View::Main);

        app.handle_event(key(KeyCode::Char('l'))).await.unwrap();
        assert_eq!(app.state.view, View::Queue);
        assert_eq!(app.state.queue, QueueState::Loading);

        app.handle_event(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state.view, View::Main);
    }

    #[tokio::test]
    async fn test_bus_event_updates_main_view_record() {
        let (mut app, _rx) = test_app(Config::default());
        let info = sample_video();

        app.handle_event(TuiEvent::Bus(BusEvent::VideoInfoReceived(info.clone())))
            .await
            .unwrap();

        assert_eq!(app.state.video_info, Some(info));
    }

    #[tokio::test]
    async fn test_failed_pull_synthesizes_record_from_entered_url() {
        let (tx, _rx) = mpsc::channel(16);
        let app_state = AppState::new(Config::default());
        let poller = ConnectivityPoller::with_interval(Duration::from_secs(60));
        let mut app = TuiApp::new(
            app_state,
            MessageBridge::new(),
            poller,
            Some("https://video.example/watch?v=9".to_string()),
            tx,
        );

        app.handle_event(TuiEvent::VideoInfoPulled(None)).await.unwrap();

        let info = app.state.video_info.expect("fallback record expected");
        assert_eq!(info.url, "https://video.example/watch?v=9");
        assert_eq!(info.title, "Unknown");
        assert_eq!(info.thumbnail, "");
    }

    #[tokio::test]
    #[serial]
    async fn test_save_rejects_bad_port_and_leaves_settings_alone() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        crate::util::paths::set_config_dir_override(Some(temp_dir.path().to_path_buf()));
        unsafe { std::env::set_var("VDA_TEST_MODE", "1") };

        let (mut app, _rx) = test_app(Config::default());
        let config = app.state.app_state.config_snapshot().await;
        app.state.show_settings(&config);
        app.state.form.port = "70000".to_string();

        app.save_settings().await;

        assert_eq!(app.state.view, View::Settings);
        assert_eq!(
            app.state.validation_error,
            Some(app.state.t("invalid-port"))
        );
        // Nothing was written and the shared config is untouched
        assert!(!temp_dir.path().join("settings.toml").exists());
        assert_eq!(app.state.app_state.config_snapshot().await.server.port, 8080);

        crate::util::paths::set_config_dir_override(None);
        unsafe { std::env::remove_var("VDA_TEST_MODE") };
    }

    #[tokio::test]
    #[serial]
    async fn test_save_rejects_blank_host() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        crate::util::paths::set_config_dir_override(Some(temp_dir.path().to_path_buf()));
        unsafe { std::env::set_var("VDA_TEST_MODE", "1") };

        let (mut app, _rx) = test_app(Config::default());
        let config = app.state.app_state.config_snapshot().await;
        app.state.show_settings(&config);
        app.state.form.host = "   ".to_string();

        app.save_settings().await;

        assert_eq!(app.state.view, View::Settings);
        assert_eq!(
            app.state.validation_error,
            Some(app.state.t("invalid-host"))
        );
        assert!(!temp_dir.path().join("settings.toml").exists());

        crate::util::paths::set_config_dir_override(None);
        unsafe { std::env::remove_var("VDA_TEST_MODE") };
    }

    #[tokio::test]
    #[serial]
    async fn test_save_persists_and_reloads_language_live() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        crate::util::paths::set_config_dir_override(Some(temp_dir.path().to_path_buf()));
        unsafe { std::env::set_var("VDA_TEST_MODE", "1") };

        let (mut app, _rx) = test_app(Config::default());
        let config = app.state.app_state.config_snapshot().await;
        app.state.show_settings(&config);

        let english_button = app.state.t("download-button");
        app.state.form.language_index = 1; // pl

        app.save_settings().await;

        assert_eq!(app.state.view, View::Main);
        assert!(temp_dir.path().join("settings.toml").exists());
        assert_eq!(
            app.state.app_state.config_snapshot().await.general.language,
            "pl"
        );
        // Visible text switched without a restart
        let polish_button = app.state.t("download-button");
        assert_ne!(english_button, polish_button);
        assert_eq!(app.state.status_message, Some(app.state.t("settings-saved")));

        crate::util::paths::set_config_dir_override(None);
        unsafe { std::env::remove_var("VDA_TEST_MODE") };
    }
}

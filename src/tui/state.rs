use crate::app::config::Config;
use crate::app::state::AppState;
use crate::extract::VideoInfo;
use crate::server::{ConnectionState, QueueItem};

/// Quality choices offered on the main view, as (selector, label key)
pub const QUALITY_OPTIONS: [(&str, &str); 5] = [
    ("best", "quality-best"),
    ("best[height<=720]", "quality-720"),
    ("best[height<=480]", "quality-480"),
    ("worst", "quality-worst"),
    ("bestaudio", "quality-audio"),
];

/// Container formats offered on the main view
pub const FORMAT_OPTIONS: [&str; 4] = ["mp4", "mkv", "webm", "mp3"];

/// Languages offered in settings, as (config code, label key)
pub const LANGUAGE_OPTIONS: [(&str, &str); 2] =
    [("en", "language-en"), ("pl", "language-pl")];

/// Spinner frames shown while a submission is in flight
pub const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Top-level view shown by the TUI
///
/// Settings and Queue are reachable only from Main and return only to Main.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Main,
    Settings,
    Queue,
}

/// Focusable controls on the main view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainControl {
    #[default]
    Quality,
    Format,
    DownloadButton,
}

/// Settings screen fields, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Host,
    Port,
    Folder,
    Language,
    SaveButton,
}

impl SettingsField {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Host,
            Self::Port,
            Self::Folder,
            Self::Language,
            Self::SaveButton,
        ]
    }

    /// Get translation key for label
    pub fn label_key(&self) -> &str {
        match self {
            Self::Host => "settings-host",
            Self::Port => "settings-port",
            Self::Folder => "settings-folder",
            Self::Language => "settings-language",
            Self::SaveButton => "save-button",
        }
    }

    /// Fields edited as free-form text (Language cycles, SaveButton acts)
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Host | Self::Port | Self::Folder)
    }
}

/// Lifecycle of the one-shot download control
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmitState {
    /// Control enabled, nothing pending
    #[default]
    Idle,
    /// Request in flight, control disabled
    InFlight,
    /// Terminal: job accepted. The control stays hidden until the view is
    /// re-entered or a different video arrives.
    Accepted { id: Option<u64> },
    /// Server or transport failure, control re-enabled
    Failed { message: String },
}

/// yt-dlp availability as probed when the settings view opens
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolStatus {
    #[default]
    Checking,
    Installed { version: Option<String> },
    Missing,
    /// The probe itself failed; rendered as "server not running"
    Unreachable,
}

/// Queue view contents
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueueState {
    #[default]
    Loading,
    Loaded(Vec<QueueItem>),
    Error,
}

/// Editable copy of the persisted settings
///
/// The port stays a string until save-time validation.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub host: String,
    pub port: String,
    pub folder: String,
    pub language_index: usize,
}

impl SettingsForm {
    pub fn from_config(config: &Config) -> Self {
        let language_index = LANGUAGE_OPTIONS
            .iter()
            .position(|(code, _)| *code == config.general.language)
            .unwrap_or(0);
        Self {
            host: config.server.host.clone(),
            port: config.server.port.to_string(),
            folder: config.download.folder.clone(),
            language_index,
        }
    }

    pub fn language(&self) -> &'static str {
        LANGUAGE_OPTIONS[self.language_index].0
    }
}

/// TUI application state
pub struct TuiState {
    /// Reference to app state (config, translations)
    pub app_state: AppState,

    /// Active view
    pub view: View,

    /// Latest extracted record shown on the main view
    pub video_info: Option<VideoInfo>,

    /// Last connectivity state seen from the poller
    pub connection: ConnectionState,

    /// One-shot download control lifecycle
    pub submit: SubmitState,

    /// Index into [`SPINNER_FRAMES`]
    pub spinner_frame: usize,

    /// Index into [`QUALITY_OPTIONS`]
    pub quality_index: usize,

    /// Index into [`FORMAT_OPTIONS`]
    pub format_index: usize,

    /// Focused control on the main view
    pub main_control: MainControl,

    /// Settings screen: editable form values
    pub form: SettingsForm,

    /// Settings screen: focused field index
    pub settings_field_index: usize,

    /// Settings screen: a text field is being edited
    pub editing: bool,

    /// Settings screen: buffer for the field being edited
    pub edit_buffer: String,

    /// Validation/error message to display (None = no error)
    pub validation_error: Option<String>,

    /// Transient confirmation shown in the status bar until the next input
    pub status_message: Option<String>,

    /// yt-dlp indicator on the settings screen
    pub tool_status: ToolStatus,

    /// Queue view contents
    pub queue: QueueState,

    /// Rendering optimization: flag to indicate if UI needs redraw
    needs_redraw: bool,
}

impl TuiState {
    pub fn new(app_state: AppState) -> Self {
        Self {
            app_state,
            view: View::Main,
            video_info: None,
            connection: ConnectionState::Checking,
            submit: SubmitState::Idle,
            spinner_frame: 0,
            quality_index: 0,
            format_index: 0,
            main_control: MainControl::Quality,
            form: SettingsForm::default(),
            settings_field_index: 0,
            editing: false,
            edit_buffer: String::new(),
            validation_error: None,
            status_message: None,
            tool_status: ToolStatus::Checking,
            queue: QueueState::Loading,
            needs_redraw: true,
        }
    }

    /// Get translated string by key
    pub fn t(&self, key: &str) -> String {
        self.app_state.t(key)
    }

    /// Get translated string with arguments
    pub fn t_with_args(&self, key: &str, args: Option<&fluent_bundle::FluentArgs>) -> String {
        self.app_state.t_with_args(key, args)
    }

    /// Currently selected yt-dlp quality selector
    pub fn quality(&self) -> &'static str {
        QUALITY_OPTIONS[self.quality_index].0
    }

    /// Currently selected container format
    pub fn format(&self) -> &'static str {
        FORMAT_OPTIONS[self.format_index]
    }

    /// Cycle the quality selection by `step`, wrapping
    ///
    /// Selecting `bestaudio` forces the format to `mp3`. The coupling is
    /// applied only on the control that changed, so moving quality off
    /// `bestaudio` leaves an `mp3` format in place.
    pub fn cycle_quality(&mut self, step: isize) {
        self.quality_index = cycle(self.quality_index, QUALITY_OPTIONS.len(), step);
        if self.quality() == "bestaudio" {
            if let Some(pos) = FORMAT_OPTIONS.iter().position(|f| *f == "mp3") {
                self.format_index = pos;
            }
        }
    }

    /// Cycle the format selection by `step`, wrapping
    ///
    /// Selecting `mp3` forces the quality to `bestaudio`.
    pub fn cycle_format(&mut self, step: isize) {
        self.format_index = cycle(self.format_index, FORMAT_OPTIONS.len(), step);
        if self.format() == "mp3" {
            if let Some(pos) = QUALITY_OPTIONS.iter().position(|(q, _)| *q == "bestaudio") {
                self.quality_index = pos;
            }
        }
    }

    /// Move main-view focus to the next control
    pub fn focus_next_control(&mut self) {
        self.main_control = match self.main_control {
            MainControl::Quality => MainControl::Format,
            MainControl::Format => MainControl::DownloadButton,
            MainControl::DownloadButton => MainControl::Quality,
        };
    }

    /// Move main-view focus to the previous control
    pub fn focus_prev_control(&mut self) {
        self.main_control = match self.main_control {
            MainControl::Quality => MainControl::DownloadButton,
            MainControl::Format => MainControl::Quality,
            MainControl::DownloadButton => MainControl::Format,
        };
    }

    /// Whether the download control accepts an activation right now
    pub fn submit_allowed(&self) -> bool {
        matches!(self.submit, SubmitState::Idle | SubmitState::Failed { .. })
    }

    /// Advance the in-flight spinner by one frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner_glyph(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }

    /// Store a new extraction record
    ///
    /// A different URL resets a finished submission so the control comes
    /// back for the new video; a refresh of the same URL keeps it.
    pub fn set_video_info(&mut self, info: VideoInfo) {
        let url_changed = self
            .video_info
            .as_ref()
            .map(|current| current.url != info.url)
            .unwrap_or(true);
        if url_changed && !matches!(self.submit, SubmitState::InFlight) {
            self.submit = SubmitState::Idle;
        }
        self.video_info = Some(info);
        self.mark_dirty();
    }

    /// Switch back to the main view
    ///
    /// Re-entering resets a finished submission; an in-flight one keeps
    /// running and lands via its completion event.
    pub fn show_main(&mut self) {
        self.view = View::Main;
        self.editing = false;
        if !matches!(self.submit, SubmitState::InFlight) {
            self.submit = SubmitState::Idle;
        }
        self.mark_dirty();
    }

    /// Switch to the settings view, seeding the form from `config`
    pub fn show_settings(&mut self, config: &Config) {
        self.view = View::Settings;
        self.form = SettingsForm::from_config(config);
        self.settings_field_index = 0;
        self.editing = false;
        self.edit_buffer.clear();
        self.validation_error = None;
        self.tool_status = ToolStatus::Checking;
        self.mark_dirty();
    }

    /// Switch to the queue view; contents arrive via `QueueLoaded`
    pub fn show_queue(&mut self) {
        self.view = View::Queue;
        self.queue = QueueState::Loading;
        self.mark_dirty();
    }

    /// The settings field currently under the cursor
    pub fn focused_settings_field(&self) -> SettingsField {
        let fields = SettingsField::all();
        fields[self.settings_field_index.min(fields.len() - 1)]
    }

    /// Move settings field selection down
    pub fn settings_field_down(&mut self) {
        let count = SettingsField::all().len();
        self.settings_field_index = (self.settings_field_index + 1).min(count - 1);
    }

    /// Move settings field selection up
    pub fn settings_field_up(&mut self) {
        if self.settings_field_index > 0 {
            self.settings_field_index -= 1;
        }
    }

    /// Cycle the value of the focused settings field, if it has one
    pub fn cycle_settings_value(&mut self, step: isize) {
        if self.focused_settings_field() == SettingsField::Language {
            self.form.language_index =
                cycle(self.form.language_index, LANGUAGE_OPTIONS.len(), step);
        }
    }

    /// Start editing the focused text field
    pub fn begin_edit(&mut self) {
        let field = self.focused_settings_field();
        if !field.is_text() {
            return;
        }
        self.edit_buffer = match field {
            SettingsField::Host => self.form.host.clone(),
            SettingsField::Port => self.form.port.clone(),
            SettingsField::Folder => self.form.folder.clone(),
            _ => return,
        };
        self.editing = true;
    }

    /// Commit the edit buffer into the form
    pub fn commit_edit(&mut self) {
        match self.focused_settings_field() {
            SettingsField::Host => self.form.host = self.edit_buffer.clone(),
            SettingsField::Port => self.form.port = self.edit_buffer.clone(),
            SettingsField::Folder => self.form.folder = self.edit_buffer.clone(),
            _ => {}
        }
        self.editing = false;
        self.edit_buffer.clear();
    }

    /// Abandon the edit buffer, leaving the form value untouched
    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    /// Mark UI as needing redraw (dirty flag)
    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Check if UI needs redraw
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Clear dirty flag after rendering
    pub fn clear_dirty(&mut self) {
        self.needs_redraw = false;
    }
}

fn cycle(index: usize, len: usize, step: isize) -> usize {
    debug_assert!(len > 0);
    let len = len as isize;
    (((index as isize + step) % len + len) % len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_state() -> TuiState {
        TuiState::new(AppState::new(Config::default()))
    }

    fn quality_position(selector: &str) -> usize {
        QUALITY_OPTIONS
            .iter()
            .position(|(q, _)| *q == selector)
            .unwrap()
    }

    fn format_position(format: &str) -> usize {
        FORMAT_OPTIONS.iter().position(|f| *f == format).unwrap()
    }

    #[test]
    fn test_format_mp3_forces_quality_bestaudio() {
        let mut state = test_state();
        state.format_index = format_position("webm");
        state.cycle_format(1); // webm -> mp3
        assert_eq!(state.format(), "mp3");
        assert_eq!(state.quality(), "bestaudio");
    }

    #[test]
    fn test_quality_bestaudio_forces_format_mp3() {
        let mut state = test_state();
        state.quality_index = quality_position("worst");
        state.cycle_quality(1); // worst -> bestaudio
        assert_eq!(state.quality(), "bestaudio");
        assert_eq!(state.format(), "mp3");
    }

    #[test]
    fn test_moving_quality_off_bestaudio_keeps_mp3() {
        // The coupling fires only on the control that changed.
        let mut state = test_state();
        state.quality_index = quality_position("worst");
        state.cycle_quality(1); // bestaudio, format snaps to mp3
        state.cycle_quality(1); // wraps to best
        assert_eq!(state.quality(), "best");
        assert_eq!(state.format(), "mp3");
    }

    #[test]
    fn test_cycle_wraps_both_directions() {
        let mut state = test_state();
        state.cycle_quality(-1);
        assert_eq!(state.quality(), "bestaudio");
        state.cycle_format(-2); // mp3 (from coupling) back past webm
        assert_eq!(state.format(), "mkv");
    }

    #[test]
    fn test_focus_cycles_through_main_controls() {
        let mut state = test_state();
        assert_eq!(state.main_control, MainControl::Quality);
        state.focus_next_control();
        state.focus_next_control();
        assert_eq!(state.main_control, MainControl::DownloadButton);
        state.focus_next_control();
        assert_eq!(state.main_control, MainControl::Quality);
        state.focus_prev_control();
        assert_eq!(state.main_control, MainControl::DownloadButton);
    }

    #[test]
    fn test_show_settings_seeds_form_from_config() {
        let mut state = test_state();
        let mut config = Config::default();
        config.server.host = "192.168.1.50".to_string();
        config.server.port = 9100;
        config.download.folder = "clips".to_string();
        config.general.language = "pl".to_string();

        state.show_settings(&config);

        assert_eq!(state.view, View::Settings);
        assert_eq!(state.form.host, "192.168.1.50");
        assert_eq!(state.form.port, "9100");
        assert_eq!(state.form.folder, "clips");
        assert_eq!(state.form.language(), "pl");
        assert_eq!(state.tool_status, ToolStatus::Checking);
    }

    #[test]
    fn test_reentering_main_resets_finished_submission() {
        let mut state = test_state();
        state.submit = SubmitState::Accepted { id: Some(4) };
        state.show_queue();
        state.show_main();
        assert_eq!(state.submit, SubmitState::Idle);
    }

    #[test]
    fn test_inflight_submission_survives_view_roundtrip() {
        let mut state = test_state();
        state.submit = SubmitState::InFlight;
        state.show_queue();
        state.show_main();
        assert_eq!(state.submit, SubmitState::InFlight);
    }

    #[test]
    fn test_new_video_resets_one_shot_control() {
        let mut state = test_state();
        state.set_video_info(VideoInfo::new(
            "https://a.test/v1".to_string(),
            "First".to_string(),
            String::new(),
        ));
        state.submit = SubmitState::Accepted { id: Some(9) };

        // Refresh of the same URL keeps the terminal display
        state.set_video_info(VideoInfo::new(
            "https://a.test/v1".to_string(),
            "First (refreshed)".to_string(),
            String::new(),
        ));
        assert_eq!(state.submit, SubmitState::Accepted { id: Some(9) });

        // A different URL brings the control back
        state.set_video_info(VideoInfo::new(
            "https://a.test/v2".to_string(),
            "Second".to_string(),
            String::new(),
        ));
        assert_eq!(state.submit, SubmitState::Idle);
    }

    #[test]
    fn test_settings_edit_commit_and_cancel() {
        let mut state = test_state();
        state.show_settings(&Config::default());
        state.settings_field_index = 1; // Port
        state.begin_edit();
        assert!(state.editing);
        assert_eq!(state.edit_buffer, "8080");

        state.edit_buffer = "9090".to_string();
        state.commit_edit();
        assert!(!state.editing);
        assert_eq!(state.form.port, "9090");

        state.begin_edit();
        state.edit_buffer.clear();
        state.cancel_edit();
        assert_eq!(state.form.port, "9090");
    }

    #[test]
    fn test_begin_edit_ignores_non_text_fields() {
        let mut state = test_state();
        state.show_settings(&Config::default());
        state.settings_field_index = 3; // Language
        state.begin_edit();
        assert!(!state.editing);
    }
}

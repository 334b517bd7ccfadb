use crate::bridge::BusEvent;
use crate::extract::VideoInfo;
use crate::server::{ConnectionState, QueueItem, SubmitError, SubmitOutcome, ToolCheck};
use crossterm::event::Event as CrosstermEvent;

/// TUI events that can occur
///
/// Handlers run strictly sequentially on one channel; spawned operations
/// report back here instead of being awaited inside a handler.
#[derive(Debug)]
pub enum TuiEvent {
    /// Terminal input event (keyboard, paste, resize)
    Input(CrosstermEvent),
    /// Tick event for periodic updates (spinner frames)
    Tick,
    /// Broadcast event from the message bridge
    Bus(BusEvent),
    /// Connectivity transition from the poller's watch channel
    Connection(ConnectionState),
    /// Answer to a direct video-info pull, `None` when the watcher had
    /// nothing or could not be reached
    VideoInfoPulled(Option<VideoInfo>),
    /// A spawned submission finished
    SubmitFinished(Result<SubmitOutcome, SubmitError>),
    /// A spawned queue fetch finished
    QueueLoaded(Result<Vec<QueueItem>, reqwest::Error>),
    /// A spawned yt-dlp probe finished
    ToolCheckFinished(Result<ToolCheck, reqwest::Error>),
}

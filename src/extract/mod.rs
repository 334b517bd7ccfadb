//! Page metadata extraction
//!
//! Best-effort heuristics over arbitrary markup. An extraction never fails:
//! missing data degrades to placeholder values and the caller decides what
//! to do with them.

pub mod heuristics;
pub mod watcher;

pub use heuristics::extract_video_info;
pub use watcher::{fetch_and_extract, page_client, PageWatcher, WatcherHandle};

use serde::{Deserialize, Serialize};

/// Candidate video metadata for one page
///
/// Immutable once constructed; a navigation produces a whole new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub url: String,
    pub title: String,
    pub thumbnail: String,
    /// Extraction time in Unix milliseconds
    pub timestamp: i64,
}

impl VideoInfo {
    pub fn new(url: String, title: String, thumbnail: String) -> Self {
        Self {
            url,
            title,
            thumbnail,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Record synthesized from ambient data when no extraction is available,
    /// e.g. the watcher is not attached and only the entered URL is known
    pub fn fallback(url: &str) -> Self {
        Self::new(url.to_string(), "Unknown".to_string(), String::new())
    }
}

//! Download-server integration
//!
//! The server owns the queue and runs yt-dlp; this side only consumes its
//! HTTP contract: `/status` for health, `/queue` for the job list,
//! `/check-ytdlp` for the tool probe, and `POST /download` for submission.

pub mod client;
pub mod orchestrator;
pub mod poller;

pub use client::{DownloadReceipt, DownloadRequest, QueueItem, ServerClient, ToolCheck};
pub use orchestrator::{submit, SubmitError, SubmitOptions, SubmitOutcome};
pub use poller::{ConnectionState, ConnectivityPoller};

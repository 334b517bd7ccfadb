//! Download submission pipeline
//!
//! One pass per user action: precondition, duplicate check against the
//! live queue, then the job-creation request. Nothing here retries; a
//! failed submission hands control straight back to the user.

use super::client::{DownloadRequest, ServerClient};
use crate::extract::VideoInfo;
use thiserror::Error;

/// Hosts that receive the browser-cookie flag; exact match or subdomain
const COOKIE_PLATFORM_DOMAINS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
    "youtube-nocookie.com",
];

/// User-chosen submission options
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub quality: String,
    pub format: String,
    /// Output path passed through to the server
    pub output_folder: String,
}

/// Terminal success state of one submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Job id assigned by the server
    pub id: Option<u64>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// No current VideoInfo; nothing was sent
    #[error("no video selected")]
    NoVideoSelected,
    /// Exact URL already present in the live queue; nothing was sent
    #[error("video is already in the queue")]
    AlreadyQueued,
    /// Server answered and rejected the job
    #[error("download rejected by server")]
    Rejected { message: Option<String> },
    /// The request never produced a parseable answer
    #[error("server unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

/// Submit one download job
///
/// The duplicate check is best-effort: when the queue cannot be fetched
/// the submission proceeds, and a truly dead server fails the POST with
/// the same network error the check would have hidden.
pub async fn submit(
    client: &ServerClient,
    video_info: Option<&VideoInfo>,
    options: &SubmitOptions,
) -> Result<SubmitOutcome, SubmitError> {
    let info = video_info.ok_or(SubmitError::NoVideoSelected)?;

    match client.fetch_queue().await {
        Ok(queue) => {
            if queue.iter().any(|item| item.url == info.url) {
                tracing::info!("Duplicate URL in queue, refusing submit: {}", info.url);
                return Err(SubmitError::AlreadyQueued);
            }
        }
        Err(e) => {
            tracing::warn!("Queue check failed, proceeding with submit: {}", e);
        }
    }

    let request = DownloadRequest {
        url: info.url.clone(),
        quality: options.quality.clone(),
        format: options.format.clone(),
        output_path: options.output_folder.clone(),
        use_firefox_cookies: is_known_video_platform(&info.url),
    };

    tracing::info!(
        "Submitting {} (quality={}, format={})",
        request.url,
        request.quality,
        request.format
    );
    let receipt = client.submit_download(&request).await?;

    if receipt.success {
        tracing::info!("Job accepted with id {:?}", receipt.id);
        Ok(SubmitOutcome { id: receipt.id })
    } else {
        Err(SubmitError::Rejected {
            message: receipt.error,
        })
    }
}

/// Whether authenticated browser cookies are meaningful for this URL
pub fn is_known_video_platform(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();

    COOKIE_PLATFORM_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

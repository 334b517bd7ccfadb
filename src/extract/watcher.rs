//! Resident page watcher
//!
//! Owns the currently watched location. Navigations are debounced by a
//! settle delay so rapid location changes only cost one fetch; the initial
//! location is extracted immediately. Results are published on the bridge
//! and the latest record answers direct `GetVideoInfo` queries.

use super::heuristics::extract_video_info;
use super::VideoInfo;
use crate::bridge::{BusEvent, MessageBridge, Surface, SurfaceRequest};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Delay between a navigation and the re-extraction pass
pub const NAVIGATION_SETTLE: Duration = Duration::from_secs(1);

const PAGE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Steers the watcher task
#[derive(Clone)]
pub struct WatcherHandle {
    nav_tx: mpsc::Sender<String>,
}

impl WatcherHandle {
    /// Point the watcher at a new location
    ///
    /// Extraction runs after the settle delay; a newer navigation
    /// supersedes a pending one. Returns false when the watcher is gone.
    pub async fn navigate(&self, url: String) -> bool {
        self.nav_tx.send(url).await.is_ok()
    }
}

pub struct PageWatcher {
    bridge: MessageBridge,
    client: reqwest::Client,
    settle: Duration,
    current: Option<VideoInfo>,
}

impl PageWatcher {
    /// Spawn the watcher task; extracts `initial` right away when given
    pub fn spawn(
        bridge: MessageBridge,
        initial: Option<String>,
    ) -> Result<(WatcherHandle, JoinHandle<()>)> {
        Self::spawn_with_settle(bridge, initial, NAVIGATION_SETTLE)
    }

    /// Spawn with a custom settle delay (shortened in tests)
    pub fn spawn_with_settle(
        bridge: MessageBridge,
        initial: Option<String>,
        settle: Duration,
    ) -> Result<(WatcherHandle, JoinHandle<()>)> {
        let client = page_client()?;
        let (nav_tx, nav_rx) = mpsc::channel(16);
        let (req_tx, req_rx) = mpsc::channel(16);

        bridge.attach(Surface::Page, req_tx);

        let watcher = Self {
            bridge,
            client,
            settle,
            current: None,
        };
        let handle = tokio::spawn(watcher.run(initial, nav_rx, req_rx));

        Ok((WatcherHandle { nav_tx }, handle))
    }

    async fn run(
        mut self,
        initial: Option<String>,
        mut nav_rx: mpsc::Receiver<String>,
        mut req_rx: mpsc::Receiver<SurfaceRequest>,
    ) {
        if let Some(url) = initial {
            self.refresh(&url).await;
        }

        // The deadline survives loop iterations, so only a navigation
        // restarts the settle timer
        let mut pending: Option<(String, Instant)> = None;

        loop {
            let deadline = pending.as_ref().map(|(_, at)| *at);

            tokio::select! {
                maybe_url = nav_rx.recv() => match maybe_url {
                    Some(url) => {
                        tracing::debug!("Navigation to {} (settling)", url);
                        pending = Some((url, Instant::now() + self.settle));
                    }
                    None => break,
                },
                _ = wait_until(deadline), if deadline.is_some() => {
                    if let Some((url, _)) = pending.take() {
                        self.refresh(&url).await;
                    }
                }
                maybe_req = req_rx.recv() => match maybe_req {
                    Some(SurfaceRequest::GetVideoInfo { response }) => {
                        let _ = response.send(self.current.clone());
                    }
                    None => break,
                },
            }
        }

        self.bridge.detach(Surface::Page);
        tracing::debug!("Page watcher stopped");
    }

    async fn refresh(&mut self, url: &str) {
        let info = fetch_and_extract(&self.client, url).await;
        self.current = Some(info.clone());
        self.bridge.publish(BusEvent::VideoInfoUpdated(info));
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        // Guarded out by the select arm condition
        None => std::future::pending().await,
    }
}

/// HTTP client for page fetches (browser-like user agent, generous timeout)
pub fn page_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(PAGE_USER_AGENT)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Fetch a page and run the heuristics; any fetch problem degrades to an
/// extraction over empty markup (placeholder title, no thumbnail)
pub async fn fetch_and_extract(client: &reqwest::Client, url: &str) -> VideoInfo {
    let body = match client.get(url).send().await {
        Ok(response) => match response.error_for_status() {
            Ok(ok) => ok.text().await.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Page fetch for {} failed: {}", url, e);
                String::new()
            }
        },
        Err(e) => {
            tracing::warn!("Page fetch for {} failed: {}", url, e);
            String::new()
        }
    };

    extract_video_info(&body, url)
}

//! Cross-surface message bridge
//!
//! Connects the page watcher, the resident background tasks, and the UI
//! surfaces without any of them holding references to each other. Broadcast
//! topics are best-effort and at-most-once per live subscriber; direct
//! queries go through [`MessageBridge::request_video_info`] and fail with
//! [`BridgeError::NoReceiver`] when the addressed surface is not attached,
//! which callers must treat as "use fallback data".

use crate::extract::VideoInfo;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Bound for a direct surface query before it degrades to `NoReceiver`
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

const BUS_CAPACITY: usize = 32;

/// Broadcast topics carried by the bridge
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// The watcher finished an extraction pass
    VideoInfoUpdated(VideoInfo),
    /// Relay re-publish toward UI surfaces
    VideoInfoReceived(VideoInfo),
}

/// Logical endpoints that can answer direct queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Page watcher (owns the current extraction)
    Page,
    /// Resident background tasks
    Background,
    /// Interactive UI surface
    Popup,
}

/// Direct query addressed to one surface
///
/// Carries its own response channel, so a dropped handler is observable
/// as a failed send or a closed `oneshot`.
#[derive(Debug)]
pub enum SurfaceRequest {
    /// Latest extracted record, if any
    GetVideoInfo {
        response: oneshot::Sender<Option<VideoInfo>>,
    },
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The addressed surface is not attached, stopped listening, or never
    /// answered within the bounded wait
    #[error("no receiver for surface {0:?}")]
    NoReceiver(Surface),
}

#[derive(Clone)]
pub struct MessageBridge {
    bus: broadcast::Sender<BusEvent>,
    surfaces: Arc<Mutex<HashMap<Surface, mpsc::Sender<SurfaceRequest>>>>,
}

impl MessageBridge {
    pub fn new() -> Self {
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            bus,
            surfaces: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fire-and-forget broadcast to every live subscriber
    pub fn publish(&self, event: BusEvent) {
        match self.bus.send(event) {
            Ok(count) => tracing::trace!("Bus event delivered to {} subscriber(s)", count),
            // No live subscriber; best-effort delivery permits the drop
            Err(e) => tracing::trace!("Bus event dropped: {:?}", e.0),
        }
    }

    /// Subscribe to broadcast topics; events published earlier are not seen
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.bus.subscribe()
    }

    /// Attach a surface's query handler, replacing any previous one
    pub fn attach(&self, surface: Surface, handler: mpsc::Sender<SurfaceRequest>) {
        self.surfaces.lock().unwrap().insert(surface, handler);
        tracing::debug!("Surface attached: {:?}", surface);
    }

    /// Detach a surface; later queries to it fail with `NoReceiver`
    pub fn detach(&self, surface: Surface) {
        self.surfaces.lock().unwrap().remove(&surface);
        tracing::debug!("Surface detached: {:?}", surface);
    }

    /// Ask `target` for its current VideoInfo
    ///
    /// `Ok(None)` means the surface answered but has nothing extracted yet.
    pub async fn request_video_info(
        &self,
        target: Surface,
        timeout: Duration,
    ) -> Result<Option<VideoInfo>, BridgeError> {
        let handler = self
            .surfaces
            .lock()
            .unwrap()
            .get(&target)
            .cloned()
            .ok_or(BridgeError::NoReceiver(target))?;

        let (response_tx, response_rx) = oneshot::channel();
        if handler
            .send(SurfaceRequest::GetVideoInfo {
                response: response_tx,
            })
            .await
            .is_err()
        {
            // Channel closed: the surface went away without detaching
            self.detach(target);
            return Err(BridgeError::NoReceiver(target));
        }

        match tokio::time::timeout(timeout, response_rx).await {
            Ok(Ok(info)) => Ok(info),
            Ok(Err(_)) => Err(BridgeError::NoReceiver(target)),
            Err(_) => {
                tracing::warn!("Surface {:?} did not answer within {:?}", target, timeout);
                Err(BridgeError::NoReceiver(target))
            }
        }
    }
}

impl Default for MessageBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Background relay: every `VideoInfoUpdated` is re-published as
/// `VideoInfoReceived` so transient UI surfaces only need one topic.
/// Delivery failures are ignored; a closed popup is not an error.
pub fn spawn_relay(bridge: MessageBridge) -> JoinHandle<()> {
    let mut rx = bridge.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(BusEvent::VideoInfoUpdated(info)) => {
                    tracing::debug!("Relaying video info for {}", info.url);
                    bridge.publish(BusEvent::VideoInfoReceived(info));
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Relay lagged, skipped {} event(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

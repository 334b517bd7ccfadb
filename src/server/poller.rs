//! Connectivity poller
//!
//! Fixed-interval health probes published on a watch channel. No backoff:
//! the cadence stays constant however many probes fail in a row. A port
//! change does not mutate the running loop; the poller is restarted so at
//! most one probe task is ever live.

use super::client::ServerClient;
use crate::app::config::ServerConfig;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connectivity as last observed; `Checking` holds only until the first
/// probe of the current poller resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Checking => "status-checking",
            Self::Connected => "status-connected",
            Self::Disconnected => "status-disconnected",
        }
    }
}

pub struct ConnectivityPoller {
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    task: Option<JoinHandle<()>>,
    interval: Duration,
}

impl ConnectivityPoller {
    pub fn new() -> Self {
        Self::with_interval(POLL_INTERVAL)
    }

    /// Custom probe cadence (shortened in tests)
    pub fn with_interval(interval: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Checking);
        Self {
            state_tx,
            state_rx,
            task: None,
            interval,
        }
    }

    /// Watch the connectivity state
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    pub fn current(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Spawn the probe loop against the configured server
    pub fn start(&mut self, server: &ServerConfig) -> Result<()> {
        if self.task.is_some() {
            return self.restart(server);
        }

        let client = ServerClient::new(server)?;
        tracing::info!("Polling {} every {:?}", client.base_url(), self.interval);

        let tx = self.state_tx.clone();
        let interval = self.interval;
        self.task = Some(tokio::spawn(poll_loop(client, tx, interval)));
        Ok(())
    }

    /// Replace the probe loop, e.g. after the server port changed
    ///
    /// The old task is aborted first and the state returns to `Checking`
    /// until the new loop's first probe lands.
    pub fn restart(&mut self, server: &ServerConfig) -> Result<()> {
        self.stop();
        self.state_tx.send_replace(ConnectionState::Checking);
        self.start(server)
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Poller task stopped");
        }
    }
}

impl Default for ConnectivityPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConnectivityPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    client: ServerClient,
    tx: watch::Sender<ConnectionState>,
    interval: Duration,
) {
    loop {
        let next = if client.is_healthy().await {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };

        let changed = tx.send_if_modified(|state| {
            if *state != next {
                *state = next;
                true
            } else {
                false
            }
        });
        if changed {
            tracing::info!("Server connectivity: {:?}", next);
        }

        tokio::time::sleep(interval).await;
    }
}

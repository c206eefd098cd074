//! The assembled dashboard mirror and its lifecycle handle.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::client::SeatClient;
use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::service::{RefreshHandle, RefreshPolicy, spawn_refresher};
use crate::shutdown::{self, ShutdownController};
use crate::state::SharedState;
use crate::stream::{ReconnectBackoff, run_stream};

/// A running mirror of one flight's seat map.
///
/// [`DashboardMirror::spawn`] starts two worker tasks (the single-flight
/// seat refresher and the event stream driver) and immediately requests
/// the mount-time snapshot fetch. The handle is the only way to observe or
/// tear the mirror down; [`DashboardMirror::shutdown`] consumes it, so
/// teardown can only happen once.
#[derive(Debug)]
pub struct DashboardMirror {
    state: SharedState,
    refresh: RefreshHandle,
    controller: ShutdownController,
    refresh_task: JoinHandle<()>,
    stream_task: JoinHandle<()>,
}

impl DashboardMirror {
    /// Starts mirroring with the given configuration.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::UnsupportedScheme`] if no WebSocket endpoint
    /// can be derived from the backend base URL, or [`MirrorError::Http`]
    /// if the HTTP client cannot be built. Network failures do not fail
    /// `spawn`; they surface through the state and the retry policies.
    pub fn spawn(config: MirrorConfig) -> Result<Self, MirrorError> {
        let stream_url = config.stream_url()?;
        let client = SeatClient::new(&config)?;
        let state = SharedState::new(config.event_log_capacity);
        let (controller, signal) = shutdown::channel();

        let policy = RefreshPolicy::from_config(&config);
        let (refresh, refresh_task) =
            spawn_refresher(client, state.clone(), policy, signal.clone());

        // Mount-time snapshot. The first connect requests a resync as well;
        // the single-flight worker coalesces the two.
        refresh.request();

        let backoff = ReconnectBackoff::new(
            Duration::from_millis(config.reconnect_backoff_base_ms),
            Duration::from_secs(config.reconnect_backoff_cap_secs),
        );
        let stream_task = tokio::spawn(run_stream(
            stream_url,
            state.clone(),
            refresh.clone(),
            backoff,
            signal,
        ));

        tracing::info!(flight = %config.flight_id, base = %config.base_url, "mirror started");

        Ok(Self {
            state,
            refresh,
            controller,
            refresh_task,
            stream_task,
        })
    }

    /// Returns the shared dashboard state.
    #[must_use]
    pub const fn state(&self) -> &SharedState {
        &self.state
    }

    /// Requests an out-of-band seat refresh (the stream requests its own).
    pub fn request_refresh(&self) {
        self.refresh.request();
    }

    /// Tears the mirror down: raises the shutdown flag, lets the stream
    /// task send its single close frame, and waits for both workers to
    /// stop. After this returns, no further state update happens.
    pub async fn shutdown(self) {
        self.controller.raise();
        let _ = self.stream_task.await;
        let _ = self.refresh_task.await;
        tracing::info!("mirror shut down");
    }
}

//! Component-local dashboard state and its shared wrapper.
//!
//! The whole mirrored view lives in one [`DashboardState`] struct, mutated
//! only through the named transitions below (no globals, no ad-hoc writes).
//! [`SharedState`] wraps it in an `Arc<RwLock<..>>` for the worker tasks:
//! the refresher writes snapshots, the stream task records events and
//! connection changes, and consumers clone the whole thing out via
//! [`SharedState::snapshot`].

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{EventLog, LogEntry, SeatMap, SeatRecord};
use crate::error::MirrorError;

/// Where the event stream currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// First connection attempt is in progress.
    Connecting,
    /// The stream is up and delivering frames.
    Connected,
    /// The stream dropped; the given reconnect attempt is pending.
    Reconnecting {
        /// 1-based reconnect attempt counter.
        attempt: u32,
    },
    /// The mirror was shut down; no further connection will be made.
    Closed,
}

/// The full mirrored view of one flight.
#[derive(Debug, Clone)]
pub struct DashboardState {
    seats: SeatMap,
    events: EventLog,
    connection: ConnectionStatus,
    last_refresh_error: Option<String>,
}

impl DashboardState {
    /// Creates the initial state: empty seat map, empty log, connecting.
    #[must_use]
    pub fn new(event_log_capacity: usize) -> Self {
        Self {
            seats: SeatMap::new(),
            events: EventLog::new(event_log_capacity),
            connection: ConnectionStatus::Connecting,
            last_refresh_error: None,
        }
    }

    /// Replaces the seat map wholesale and clears any surfaced refresh
    /// error.
    pub fn apply_snapshot(&mut self, records: Vec<SeatRecord>) {
        self.seats.replace(records);
        self.last_refresh_error = None;
    }

    /// Records one arrived event in the bounded log.
    pub fn record_event(&mut self, entry: LogEntry) {
        self.events.record(entry);
    }

    /// Moves the stream to a new connection status.
    pub fn set_connection(&mut self, status: ConnectionStatus) {
        self.connection = status;
    }

    /// Surfaces a refresh failure after its retries were exhausted.
    pub fn refresh_failed(&mut self, error: &MirrorError) {
        self.last_refresh_error = Some(error.to_string());
    }

    /// Returns the current seat snapshot.
    #[must_use]
    pub const fn seats(&self) -> &SeatMap {
        &self.seats
    }

    /// Returns the event log.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Returns the current stream status.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    /// Returns the last surfaced refresh error, if the most recent refresh
    /// failed.
    #[must_use]
    pub fn last_refresh_error(&self) -> Option<&str> {
        self.last_refresh_error.as_deref()
    }
}

/// Shared handle to the dashboard state.
///
/// Cheap to clone; all mutation goes through the transition methods so the
/// lock scope stays inside this module.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<DashboardState>>,
}

impl SharedState {
    /// Creates shared state with an empty dashboard.
    #[must_use]
    pub fn new(event_log_capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(DashboardState::new(event_log_capacity))),
        }
    }

    /// See [`DashboardState::apply_snapshot`].
    pub async fn apply_snapshot(&self, records: Vec<SeatRecord>) {
        self.inner.write().await.apply_snapshot(records);
    }

    /// See [`DashboardState::record_event`].
    pub async fn record_event(&self, entry: LogEntry) {
        self.inner.write().await.record_event(entry);
    }

    /// See [`DashboardState::set_connection`].
    pub async fn set_connection(&self, status: ConnectionStatus) {
        self.inner.write().await.set_connection(status);
    }

    /// See [`DashboardState::refresh_failed`].
    pub async fn refresh_failed(&self, error: &MirrorError) {
        self.inner.write().await.refresh_failed(error);
    }

    /// Clones the current state out for rendering or assertions.
    pub async fn snapshot(&self) -> DashboardState {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::StreamEvent;

    fn seat(code: &str, class: &str) -> SeatRecord {
        SeatRecord {
            seat_code: code.to_string(),
            seat_class: class.to_string(),
        }
    }

    #[tokio::test]
    async fn snapshot_reflects_transitions() {
        let state = SharedState::new(50);
        state.apply_snapshot(vec![seat("1A", "business")]).await;
        state
            .record_event(LogEntry::new(StreamEvent::from_value(
                serde_json::json!({"type": "other"}),
            )))
            .await;
        state.set_connection(ConnectionStatus::Connected).await;

        let view = state.snapshot().await;
        assert_eq!(view.seats().len(), 1);
        assert_eq!(view.events().len(), 1);
        assert_eq!(view.connection(), &ConnectionStatus::Connected);
        assert!(view.last_refresh_error().is_none());
    }

    #[tokio::test]
    async fn successful_refresh_clears_surfaced_error() {
        let state = SharedState::new(50);
        state
            .refresh_failed(&MirrorError::UnexpectedStatus {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
            .await;
        let view = state.snapshot().await;
        assert!(view.last_refresh_error().is_some());

        state.apply_snapshot(vec![seat("1A", "business")]).await;
        let view = state.snapshot().await;
        assert!(view.last_refresh_error().is_none());
    }

    #[test]
    fn initial_state_is_connecting_and_empty() {
        let state = DashboardState::new(50);
        assert!(state.seats().is_empty());
        assert!(state.events().is_empty());
        assert_eq!(state.connection(), &ConnectionStatus::Connecting);
    }
}

//! Single-flight seat refresh worker.
//!
//! Every seat snapshot fetch in the mirror goes through one worker task.
//! That single-flight discipline is what rules out refresh races: requests
//! arriving while a fetch is in flight coalesce into exactly one follow-up
//! fetch, and only the worker ever applies snapshots, in completion order,
//! so a stale in-flight response can never overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::client::SeatClient;
use crate::config::MirrorConfig;
use crate::domain::FlightId;
use crate::shutdown::ShutdownSignal;
use crate::state::SharedState;

/// Retry behavior for one refresh.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    /// The flight whose snapshot is fetched.
    pub flight_id: FlightId,
    /// Additional retries after the first failed attempt.
    pub max_retries: u32,
    /// Base of the exponential backoff between retries.
    pub backoff_base: Duration,
}

impl RefreshPolicy {
    /// Derives the policy from the mirror configuration.
    #[must_use]
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self {
            flight_id: config.flight_id,
            max_retries: config.refresh_max_retries,
            backoff_base: Duration::from_millis(config.refresh_backoff_base_ms),
        }
    }
}

/// Cheap, cloneable trigger for the refresh worker.
///
/// [`RefreshHandle::request`] is synchronous and never blocks: it stores at
/// most one pending permit, so any burst of triggers while a fetch is in
/// flight collapses into a single follow-up fetch.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
}

impl RefreshHandle {
    /// Asks the worker to refresh the seat snapshot soon.
    pub fn request(&self) {
        self.notify.notify_one();
    }
}

/// Spawns the refresh worker.
///
/// Returns the trigger handle and the worker's join handle; the worker
/// exits once the shutdown signal is raised.
#[must_use]
pub fn spawn_refresher(
    client: SeatClient,
    state: SharedState,
    policy: RefreshPolicy,
    mut signal: ShutdownSignal,
) -> (RefreshHandle, JoinHandle<()>) {
    let notify = Arc::new(Notify::new());
    let handle = RefreshHandle {
        notify: Arc::clone(&notify),
    };

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = notify.notified() => {}
                () = signal.raised() => break,
            }
            refresh_once(&client, &state, &policy, &mut signal).await;
            if signal.is_raised() {
                break;
            }
        }
        tracing::debug!("seat refresher stopped");
    });

    (handle, task)
}

/// Performs one refresh: fetch, retry on retryable failures, apply.
///
/// A result arriving after shutdown is discarded without touching state.
async fn refresh_once(
    client: &SeatClient,
    state: &SharedState,
    policy: &RefreshPolicy,
    signal: &mut ShutdownSignal,
) {
    let mut attempt: u32 = 0;
    loop {
        let result = tokio::select! {
            result = client.fetch_seats(policy.flight_id) => result,
            () = signal.raised() => return,
        };

        match result {
            Ok(records) => {
                if signal.is_raised() {
                    return;
                }
                let seats = records.len();
                state.apply_snapshot(records).await;
                tracing::debug!(flight = %policy.flight_id, seats, "seat snapshot applied");
                return;
            }
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt = attempt.saturating_add(1);
                let delay = retry_delay(policy.backoff_base, attempt);
                tracing::warn!(%err, attempt, delay_ms = delay.as_millis() as u64, "seat refresh failed; retrying");
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = signal.raised() => return,
                }
            }
            Err(err) => {
                if signal.is_raised() {
                    return;
                }
                tracing::error!(%err, flight = %policy.flight_id, "seat refresh failed");
                state.refresh_failed(&err).await;
                return;
            }
        }
    }
}

/// Exponential retry delay: `base * 2^(attempt - 1)`, saturating.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

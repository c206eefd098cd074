//! ams-mirror entry point.
//!
//! Runs the headless dashboard mirror against the configured backend and
//! logs a one-line summary of the mirrored state on an interval.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use ams_mirror::client::SeatClient;
use ams_mirror::config::MirrorConfig;
use ams_mirror::mirror::DashboardMirror;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = MirrorConfig::from_env()?;
    tracing::info!(base = %config.base_url, flight = %config.flight_id, "starting ams-mirror");

    // Startup probe; the mirror retries on its own, so this is advisory.
    let probe = SeatClient::new(&config)?;
    if let Err(err) = probe.health().await {
        tracing::warn!(%err, "backend health probe failed");
    }

    let mirror = DashboardMirror::spawn(config)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(10));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let view = mirror.state().snapshot().await;
                let latest = view
                    .events()
                    .latest()
                    .and_then(|entry| entry.event.event_type().map(str::to_string));
                tracing::info!(
                    seats = view.seats().len(),
                    snapshot_version = view.seats().version(),
                    events = view.events().len(),
                    latest_event = latest.as_deref().unwrap_or("-"),
                    status = ?view.connection(),
                    refresh_error = view.last_refresh_error().unwrap_or("-"),
                    "dashboard"
                );
            }
        }
    }

    tracing::info!("shutting down");
    mirror.shutdown().await;
    Ok(())
}

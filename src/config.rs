//! Mirror configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a sensible default so the
//! mirror starts against a local backend with no configuration at all.

use std::time::Duration;

use reqwest::Url;

use crate::domain::FlightId;
use crate::error::MirrorError;

/// Top-level mirror configuration.
///
/// Loaded once at startup via [`MirrorConfig::from_env`].
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Backend origin the mirror talks to (e.g. `http://127.0.0.1:8000`).
    pub base_url: Url,

    /// The single flight whose seat map is mirrored.
    pub flight_id: FlightId,

    /// Maximum number of events retained in the in-memory log.
    pub event_log_capacity: usize,

    /// Per-request timeout in seconds for seat snapshot fetches.
    pub fetch_timeout_secs: u64,

    /// Additional retries per refresh before the failure is surfaced.
    pub refresh_max_retries: u32,

    /// Base of the exponential backoff between fetch retries, in
    /// milliseconds.
    pub refresh_backoff_base_ms: u64,

    /// Base of the exponential backoff between stream reconnect attempts,
    /// in milliseconds.
    pub reconnect_backoff_base_ms: u64,

    /// Upper bound on the stream reconnect delay, in seconds.
    pub reconnect_backoff_cap_secs: u64,
}

impl MirrorConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::InvalidConfig`] if `AMS_BASE_URL` is set but
    /// cannot be parsed as a URL.
    pub fn from_env() -> Result<Self, MirrorError> {
        dotenvy::dotenv().ok();

        let raw_base =
            std::env::var("AMS_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let base_url = Url::parse(&raw_base)
            .map_err(|e| MirrorError::InvalidConfig(format!("AMS_BASE_URL `{raw_base}`: {e}")))?;

        let flight_id = parse_env("AMS_FLIGHT_ID", FlightId::default());
        let event_log_capacity = parse_env("EVENT_LOG_CAPACITY", 50);
        let fetch_timeout_secs = parse_env("FETCH_TIMEOUT_SECS", 5);
        let refresh_max_retries = parse_env("REFRESH_MAX_RETRIES", 3);
        let refresh_backoff_base_ms = parse_env("REFRESH_BACKOFF_BASE_MS", 200);
        let reconnect_backoff_base_ms = parse_env("RECONNECT_BACKOFF_BASE_MS", 500);
        let reconnect_backoff_cap_secs = parse_env("RECONNECT_BACKOFF_CAP_SECS", 30);

        Ok(Self {
            base_url,
            flight_id,
            event_log_capacity,
            fetch_timeout_secs,
            refresh_max_retries,
            refresh_backoff_base_ms,
            reconnect_backoff_base_ms,
            reconnect_backoff_cap_secs,
        })
    }

    /// Returns the Seat Query Service endpoint for the given flight.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::InvalidConfig`] if the base URL cannot be
    /// joined with the seats path (e.g. a `cannot-be-a-base` URL).
    pub fn seats_url(&self, flight_id: FlightId) -> Result<Url, MirrorError> {
        self.base_url
            .join(&format!("/flights/{flight_id}/seats"))
            .map_err(|e| MirrorError::InvalidConfig(format!("seats url: {e}")))
    }

    /// Returns the Event Stream Service endpoint.
    ///
    /// The WebSocket scheme mirrors the backend scheme: `http` becomes `ws`
    /// and `https` becomes `wss`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::UnsupportedScheme`] for any base scheme other
    /// than `http` or `https`.
    pub fn stream_url(&self) -> Result<Url, MirrorError> {
        let ws_scheme = match self.base_url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(MirrorError::UnsupportedScheme(other.to_string())),
        };
        let mut url = self.base_url.clone();
        url.set_scheme(ws_scheme)
            .map_err(|()| MirrorError::UnsupportedScheme(self.base_url.scheme().to_string()))?;
        url.set_path("/ws");
        Ok(url)
    }

    /// Per-request timeout for seat snapshot fetches.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

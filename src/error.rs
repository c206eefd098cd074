//! Mirror error types with retryability classification.
//!
//! [`MirrorError`] is the central error type for the crate. The mirror is a
//! client, so instead of mapping variants to HTTP response codes it maps them
//! to a retry decision: transport hiccups and server-side failures are worth
//! retrying, while scheme and configuration problems are terminal.

/// Central error type for all mirror operations.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// HTTP transport failure while talking to the Seat Query Service.
    #[error("seat query failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Seat Query Service answered with a non-success status.
    #[error("seat query returned status {status}")]
    UnexpectedStatus {
        /// The HTTP status the backend returned.
        status: reqwest::StatusCode,
    },

    /// A payload could not be decoded as the expected JSON shape.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket transport failure on the event stream.
    #[error("event stream failure: {0}")]
    Stream(#[from] tokio_tungstenite::tungstenite::Error),

    /// The backend base URL uses a scheme the mirror cannot derive a
    /// WebSocket endpoint from.
    #[error("unsupported backend scheme: {0}")]
    UnsupportedScheme(String),

    /// A configuration value could not be parsed or combined into a URL.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The operation was abandoned because the mirror is shutting down.
    #[error("mirror is shutting down")]
    ShuttingDown,
}

impl MirrorError {
    /// Returns `true` if retrying the failed operation may succeed.
    ///
    /// Transport failures and server-side (5xx / 429) statuses are
    /// retryable; malformed payloads, bad configuration, and shutdown are
    /// not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Stream(_) => true,
            Self::UnexpectedStatus { status } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            Self::Json(_)
            | Self::UnsupportedScheme(_)
            | Self::InvalidConfig(_)
            | Self::ShuttingDown => false,
        }
    }
}

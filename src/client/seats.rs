//! Thin HTTP adapter over the Seat Query Service.

use reqwest::Url;

use crate::config::MirrorConfig;
use crate::domain::{FlightId, SeatRecord};
use crate::error::MirrorError;

/// Client for the Seat Query Service.
///
/// Holds one connection-pooling [`reqwest::Client`] with the configured
/// per-request timeout. All methods map transport and status failures into
/// [`MirrorError`] so the caller can apply its retry policy.
#[derive(Debug, Clone)]
pub struct SeatClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SeatClient {
    /// Builds a client from the mirror configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Http`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &MirrorConfig) -> Result<Self, MirrorError> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetches the full current seat snapshot for a flight.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Http`] on transport failure,
    /// [`MirrorError::UnexpectedStatus`] on a non-2xx answer, and
    /// [`MirrorError::Http`] again if the body is not a JSON seat array.
    pub async fn fetch_seats(&self, flight_id: FlightId) -> Result<Vec<SeatRecord>, MirrorError> {
        let url = self.endpoint(&format!("/flights/{flight_id}/seats"))?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MirrorError::UnexpectedStatus {
                status: response.status(),
            });
        }
        Ok(response.json().await?)
    }

    /// Probes the backend health endpoint.
    ///
    /// Used once at startup; a failure is worth a warning but never stops
    /// the mirror.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Http`] on transport failure and
    /// [`MirrorError::UnexpectedStatus`] on a non-2xx answer.
    pub async fn health(&self) -> Result<(), MirrorError> {
        let url = self.endpoint("/health")?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MirrorError::UnexpectedStatus {
                status: response.status(),
            });
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, MirrorError> {
        self.base_url
            .join(path)
            .map_err(|e| MirrorError::InvalidConfig(format!("endpoint {path}: {e}")))
    }
}

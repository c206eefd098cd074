//! Inbound stream events, validated at the boundary.
//!
//! The Event Stream Service pushes opaque JSON frames with an optional
//! `type` tag. [`StreamEvent`] turns that into a tagged union over the
//! event vocabulary the backend actually publishes, with a catch-all
//! variant for everything else: unknown events are kept, not dropped,
//! because the dashboard log renders them verbatim.
//!
//! The one rule the mirror enforces is the refresh trigger: any event whose
//! tag starts with `"seat"` invalidates the local seat snapshot, including
//! `seat_*` tags this build has never heard of.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FlightId;

/// Payload of a `seat_held` event: a seat entered the hold window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatHold {
    /// Flight the held seat belongs to.
    pub flight_id: FlightId,
    /// Seat designator, e.g. `"12C"`.
    pub seat: String,
    /// User holding the seat, when the backend includes it.
    #[serde(default)]
    pub holder: Option<i64>,
}

/// Payload of a `seat_confirmed` event: a hold became a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatConfirmation {
    /// Flight the confirmed seat belongs to.
    pub flight_id: FlightId,
    /// Seat designator.
    pub seat: String,
    /// Backend booking id created by the confirmation.
    pub booking_id: i64,
}

/// Payload of a `payment_succeeded` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotice {
    /// Booking the payment settles.
    pub booking_id: i64,
    /// Backend payment id.
    pub payment_id: i64,
}

/// One event from the stream, decoded at the boundary.
///
/// Known tags decode into typed payloads; anything else (unknown tags,
/// known tags with unexpected payload shapes, events with no tag at all)
/// lands in [`StreamEvent::Unknown`] with the raw value preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `seat_held`
    SeatHeld(SeatHold),
    /// `seat_confirmed`
    SeatConfirmed(SeatConfirmation),
    /// `payment_succeeded`
    PaymentSucceeded(PaymentNotice),
    /// Any other JSON value the stream delivered.
    Unknown {
        /// The raw `type` tag, when the payload carried a string one.
        event_type: Option<String>,
        /// The payload exactly as it arrived.
        payload: serde_json::Value,
    },
}

impl StreamEvent {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if the frame is not
    /// JSON at all; callers discard such frames.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }

    /// Classifies an already-parsed JSON value.
    ///
    /// A known tag whose payload fails to decode falls back to
    /// [`StreamEvent::Unknown`] rather than erroring: the stream promises
    /// no schema, and the log keeps whatever arrived.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        let decoded = match value.get("type").and_then(serde_json::Value::as_str) {
            Some("seat_held") => serde_json::from_value(value.clone()).ok().map(Self::SeatHeld),
            Some("seat_confirmed") => serde_json::from_value(value.clone())
                .ok()
                .map(Self::SeatConfirmed),
            Some("payment_succeeded") => serde_json::from_value(value.clone())
                .ok()
                .map(Self::PaymentSucceeded),
            _ => None,
        };

        decoded.unwrap_or_else(|| {
            let event_type = value
                .get("type")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            Self::Unknown {
                event_type,
                payload: value,
            }
        })
    }

    /// Returns the raw `type` tag of this event, if it carried one.
    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        match self {
            Self::SeatHeld(_) => Some("seat_held"),
            Self::SeatConfirmed(_) => Some("seat_confirmed"),
            Self::PaymentSucceeded(_) => Some("payment_succeeded"),
            Self::Unknown { event_type, .. } => event_type.as_deref(),
        }
    }

    /// Returns `true` if this event invalidates the local seat snapshot.
    ///
    /// The trigger is a prefix rule on the tag: `seat_held`,
    /// `seat_confirmed`, `seat_assigned`, and any future `seat*` tag all
    /// qualify.
    #[must_use]
    pub fn triggers_seat_refresh(&self) -> bool {
        self.event_type().is_some_and(|t| t.starts_with("seat"))
    }
}

/// One entry in the dashboard event log: an event plus its arrival stamp.
///
/// The log is ordered by arrival, not by any timestamp inside the event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// The decoded event.
    pub event: StreamEvent,
    /// When the frame arrived at the mirror.
    pub received_at: DateTime<Utc>,
}

impl LogEntry {
    /// Wraps an event with the current arrival time.
    #[must_use]
    pub fn new(event: StreamEvent) -> Self {
        Self {
            event,
            received_at: Utc::now(),
        }
    }
}

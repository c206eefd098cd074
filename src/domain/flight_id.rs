//! Type-safe flight identifier.
//!
//! [`FlightId`] is a newtype wrapper around the backend's integer flight
//! key, providing type safety so flight identifiers cannot be confused with
//! other integers (booking ids, payment ids).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a flight on the backend.
///
/// The backend keys flights by integer primary key; the mirror tracks
/// exactly one of them. Used to build the seat snapshot URL and to match
/// inbound events against the mirrored flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(i64);

impl FlightId {
    /// Creates a `FlightId` from a raw backend key.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw backend key.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Default for FlightId {
    /// The demo flight every unconfigured mirror watches.
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FlightId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<FlightId> for i64 {
    fn from(id: FlightId) -> Self {
        id.0
    }
}

impl FromStr for FlightId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_plain_integer() {
        let id = FlightId::new(42);
        assert_eq!(format!("{id}"), "42");
    }

    #[test]
    fn default_is_demo_flight() {
        assert_eq!(FlightId::default(), FlightId::new(1));
    }

    #[test]
    fn parses_from_env_style_string() {
        let Ok(id) = "17".parse::<FlightId>() else {
            panic!("expected parse to succeed");
        };
        assert_eq!(id, FlightId::new(17));
        assert!("seventeen".parse::<FlightId>().is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let id = FlightId::new(3);
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "3");
        let Ok(back) = serde_json::from_str::<FlightId>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, id);
    }
}

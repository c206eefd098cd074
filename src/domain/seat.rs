//! Seat records and the wholesale-replacement seat map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One seat as reported by the Seat Query Service.
///
/// `seat_code` is unique per flight. The backend includes additional fields
/// (such as its own row id) which the mirror ignores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRecord {
    /// Seat designator, e.g. `"12C"`. Unique within a flight.
    pub seat_code: String,
    /// Cabin class label, e.g. `"economy"` or `"business"`.
    pub seat_class: String,
}

/// The local replica of one flight's seat set.
///
/// The set is replaced wholesale on every refresh; there is no incremental
/// patching, because the backend publishes no patch schema. `version` is a
/// local monotonic counter bumped on every replacement, useful for telling
/// "refreshed with identical data" apart from "never refreshed".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatMap {
    records: Vec<SeatRecord>,
    version: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl SeatMap {
    /// Creates an empty, never-fetched seat map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire seat set with a fresh snapshot.
    pub fn replace(&mut self, records: Vec<SeatRecord>) {
        self.records = records;
        self.version = self.version.saturating_add(1);
        self.fetched_at = Some(Utc::now());
    }

    /// Returns the current seat records.
    #[must_use]
    pub fn records(&self) -> &[SeatRecord] {
        &self.records
    }

    /// Returns the local snapshot version (0 = never fetched).
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns when the current snapshot was fetched, if ever.
    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Returns the number of seats in the current snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no snapshot has any seats.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

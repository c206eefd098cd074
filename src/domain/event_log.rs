//! Bounded, newest-first event log.

use std::collections::VecDeque;

use super::event::LogEntry;

/// Arrival-ordered ring of the most recent stream events.
///
/// Newest entries sit at the front. Once `capacity` entries are held, every
/// new arrival evicts the oldest. Invariants: `len() <= capacity()`, and
/// iteration yields reverse arrival order regardless of any timestamps
/// inside the events themselves.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    /// Creates an empty log holding at most `capacity` entries.
    ///
    /// A zero capacity is bumped to one so the log can always hold the
    /// latest event.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends a new arrival, evicting the oldest entry past capacity.
    pub fn record(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Iterates entries newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Returns the most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Returns the number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of retained entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

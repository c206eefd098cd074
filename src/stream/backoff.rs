//! Exponential reconnect backoff.

use std::time::Duration;

/// Delay schedule for stream reconnect attempts.
///
/// Doubles from `base` per attempt up to `cap`; a successful connect
/// resets the schedule.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    cap: Duration,
    attempt: u32,
}

impl ReconnectBackoff {
    /// Creates a schedule with the given base delay and upper bound.
    #[must_use]
    pub const fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            attempt: 0,
        }
    }

    /// Returns the delay before the next attempt and advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
        self.attempt = self.attempt.saturating_add(1);
        self.base.saturating_mul(factor).min(self.cap)
    }

    /// Returns how many consecutive attempts have been scheduled.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Resets the schedule after a successful connect.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

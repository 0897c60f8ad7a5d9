use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock source for attempt timestamps, fixed in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Remaining time below which the countdown is shown as running low (5 minutes).
pub const LOW_TIME_THRESHOLD_SECS: u64 = 300;

/// Whole-second countdown for a timed attempt.
///
/// Only ever moves down; there is no pause or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    total_secs: u64,
    remaining_secs: u64,
}

impl Countdown {
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        Self::from_secs(u64::from(minutes) * 60)
    }

    #[must_use]
    pub fn from_secs(total_secs: u64) -> Self {
        Self {
            total_secs,
            remaining_secs: total_secs,
        }
    }

    /// Resume a countdown with some time already consumed.
    #[must_use]
    pub fn resumed(total_secs: u64, remaining_secs: u64) -> Self {
        Self {
            total_secs,
            remaining_secs: remaining_secs.min(total_secs),
        }
    }

    /// Consumes `secs` seconds and returns true if this tick reached zero.
    pub fn tick(&mut self, secs: u64) -> bool {
        if self.remaining_secs == 0 {
            return false;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(secs);
        self.remaining_secs == 0
    }

    #[must_use]
    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs - self.remaining_secs
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    #[must_use]
    pub fn is_low(&self) -> bool {
        self.remaining_secs < LOW_TIME_THRESHOLD_SECS
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_reports_zero_crossing_once() {
        let mut c = Countdown::from_secs(2);
        assert!(!c.tick(1));
        assert!(c.tick(1));
        assert!(!c.tick(1));
        assert!(c.is_expired());
        assert_eq!(c.elapsed_secs(), 2);
    }

    #[test]
    fn countdown_saturates() {
        let mut c = Countdown::from_minutes(1);
        assert!(c.tick(500));
        assert_eq!(c.remaining_secs(), 0);
        assert_eq!(c.elapsed_secs(), 60);
    }

    #[test]
    fn low_time_threshold() {
        let mut c = Countdown::from_minutes(90);
        assert!(!c.is_low());
        c.tick(90 * 60 - 299);
        assert!(c.is_low());
    }

    #[test]
    fn resumed_clamps_remaining() {
        let c = Countdown::resumed(60, 600);
        assert_eq!(c.remaining_secs(), 60);
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(5));
    }
}

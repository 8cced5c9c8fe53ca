//! Wall-clock source, injectable for tests.

use chrono::{DateTime, Local, Timelike, Utc};
use parking_lot::Mutex;

/// Trait for obtaining the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Minute of the hour, 0..=59, on the clock's wall time.
    fn minute_of_hour(&self) -> u32 {
        self.now().minute()
    }
}

/// System clock implementation using real time.
///
/// Minutes are read in the host's local timezone, which differs from UTC
/// in half-hour and 45-minute offset zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn minute_of_hour(&self) -> u32 {
        self.now().with_timezone(&Local).minute()
    }
}

/// Clock that only moves when told to. Minutes are read in UTC.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock fixed at the given minute of an arbitrary hour.
    pub fn at_minute(minute: u32) -> Self {
        let base = DateTime::<Utc>::default();
        Self::new(base + chrono::Duration::minutes(i64::from(minute % 60)))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_minute() {
        let clock = ManualClock::at_minute(45);
        assert_eq!(clock.minute_of_hour(), 45);
        clock.advance(chrono::Duration::minutes(20));
        assert_eq!(clock.minute_of_hour(), 5);
    }

    #[test]
    fn test_system_clock_uses_local_minute() {
        let before = Local::now().minute();
        let minute = SystemClock.minute_of_hour();
        let after = Local::now().minute();
        assert!(minute == before || minute == after);
    }
}

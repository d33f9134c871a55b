//! Wall-clock access and calendar-day computation
//!
//! The quota resets at local midnight, so every timestamp handed to the
//! tracker carries its UTC offset and the day is taken in that offset.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use parking_lot::Mutex;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current time in the local offset
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Clock backed by the system's local timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.lock();
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock()
    }
}

/// Calendar day of `now` in its own timezone
pub fn calendar_day<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

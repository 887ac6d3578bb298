//! The world clock.

use wcs_core::SimTime;
use wcs_core::time::HOURS_PER_DAY;

/// Hour-of-day and day counter.
///
/// Each [`tick`][Self::tick] does exactly one of: advance the hour, or reset
/// the hour to 0 and increment the day.
#[derive(Clone, Debug, Default)]
pub struct WorldClock {
    now: SimTime,
}

impl WorldClock {
    pub fn new() -> Self {
        Self { now: SimTime::START }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Advance by one simulated hour and return the new time.
    pub fn tick(&mut self) -> SimTime {
        self.now = self.now.next_hour();
        debug_assert!(self.now.hour < HOURS_PER_DAY);
        self.now
    }
}

//! Simulated time model.
//!
//! # Design
//!
//! Simulated time advances in whole hours.  A [`SimTime`] is a `(day, hour)`
//! pair with `day ≥ 1` and `hour ∈ [0, 24)`; the clock that advances it lives
//! in `wcs-world`.  Durations that are sampled from continuous distributions
//! (repair times) produce a [`DueTime`] with a fractional hour.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: u32 = 24;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// A point on the simulated calendar.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SimTime {
    pub day:  u32,
    pub hour: u32,
}

impl SimTime {
    /// Day 1, 00:00: the first instant of every run.
    pub const START: SimTime = SimTime { day: 1, hour: 0 };

    #[inline]
    pub fn new(day: u32, hour: u32) -> Self {
        debug_assert!(hour < HOURS_PER_DAY);
        Self { day, hour }
    }

    /// The next hour, rolling over into the next day at 24.
    #[inline]
    pub fn next_hour(self) -> SimTime {
        if self.hour + 1 >= HOURS_PER_DAY {
            SimTime { day: self.day + 1, hour: 0 }
        } else {
            SimTime { day: self.day, hour: self.hour + 1 }
        }
    }

    /// Whole hours since day 1, 00:00.
    #[inline]
    pub fn absolute_hours(self) -> u64 {
        (self.day.saturating_sub(1) as u64) * HOURS_PER_DAY as u64 + self.hour as u64
    }

    /// Hours elapsed from `earlier` to `self`, correct across day rollover.
    /// Saturates at zero if `earlier` is later than `self`.
    #[inline]
    pub fn hours_since(self, earlier: SimTime) -> u64 {
        self.absolute_hours().saturating_sub(earlier.absolute_hours())
    }

    /// Night hours (00:00–06:00 inclusive) halve the bin fill rate.
    #[inline]
    pub fn is_night(self) -> bool {
        self.hour <= 6
    }

    /// Shift by a fractional number of hours, wrapping the hour into
    /// subsequent days.
    pub fn offset_hours(self, hours: f64) -> DueTime {
        let raw = self.hour as f64 + hours.max(0.0);
        let extra_days = (raw / HOURS_PER_DAY as f64).floor();
        DueTime {
            day:  self.day + extra_days as u32,
            hour: raw - extra_days * HOURS_PER_DAY as f64,
        }
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::START
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} {:02}:00", self.day, self.hour)
    }
}

// ── DueTime ───────────────────────────────────────────────────────────────────

/// A deadline on the simulated calendar with a fractional hour
/// (`hour ∈ [0, 24)`).
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DueTime {
    pub day:  u32,
    pub hour: f64,
}

impl DueTime {
    /// `true` once `now` has reached or passed this deadline.
    #[inline]
    pub fn reached_by(self, now: SimTime) -> bool {
        now.day > self.day || (now.day == self.day && now.hour as f64 >= self.hour)
    }

    /// Hours left until the deadline from `now`; zero if already reached.
    pub fn remaining_from(self, now: SimTime) -> f64 {
        let due = (self.day.saturating_sub(1) as f64) * HOURS_PER_DAY as f64 + self.hour;
        (due - now.absolute_hours() as f64).max(0.0)
    }
}

impl fmt::Display for DueTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = (self.hour.fract() * 60.0) as u32;
        write!(f, "day {} {:02}:{:02}", self.day, self.hour as u32, minutes)
    }
}

// ── HourWindow ────────────────────────────────────────────────────────────────

/// An inclusive range of hours of the day, e.g. `7..=9` for morning rush.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end:   u32,
}

impl HourWindow {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(self, hour: u32) -> bool {
        self.start <= hour && hour <= self.end
    }
}

//! Simulation observer trait for progress reporting and data collection.

use wcs_core::SimTime;

use crate::{FrameSnapshot, SimSummary};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// hourly loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: day counter
///
/// ```rust,ignore
/// struct Days(u32);
///
/// impl SimObserver for Days {
///     fn on_tick_end(&mut self, frame: &FrameSnapshot) {
///         if frame.time.hour == 0 {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of each hour, before the world advances.
    fn on_tick_start(&mut self, _now: SimTime) {}

    /// Called after the world advanced and the new view was published.
    ///
    /// `frame` is the read-only snapshot an external renderer would draw.
    fn on_tick_end(&mut self, _frame: &FrameSnapshot) {}

    /// Called once after the last hour, or after an interruption, with the
    /// aggregated run statistics.
    fn on_sim_end(&mut self, _summary: &SimSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Fan out to two observers, `A` first.
impl<A: SimObserver, B: SimObserver> SimObserver for (A, B) {
    fn on_tick_start(&mut self, now: SimTime) {
        self.0.on_tick_start(now);
        self.1.on_tick_start(now);
    }

    fn on_tick_end(&mut self, frame: &FrameSnapshot) {
        self.0.on_tick_end(frame);
        self.1.on_tick_end(frame);
    }

    fn on_sim_end(&mut self, summary: &SimSummary) {
        self.0.on_sim_end(summary);
        self.1.on_sim_end(summary);
    }
}

impl<T: SimObserver + ?Sized> SimObserver for &mut T {
    fn on_tick_start(&mut self, now: SimTime) {
        (**self).on_tick_start(now);
    }

    fn on_tick_end(&mut self, frame: &FrameSnapshot) {
        (**self).on_tick_end(frame);
    }

    fn on_sim_end(&mut self, summary: &SimSummary) {
        (**self).on_sim_end(summary);
    }
}

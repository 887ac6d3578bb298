//! The `OutputWriter` trait implemented by all backend writers.

use wcs_sim::SimSummary;

use crate::{FrameRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors never interrupt a run: the observer stores them and they are
/// retrieved with [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write the entity rows of one hour.  Writers without a frame sink
    /// accept and drop them.
    fn write_frame(&mut self, rows: &[FrameRow]) -> OutputResult<()>;

    /// Record the aggregate of one run.
    fn write_summary(&mut self, summary: &SimSummary) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

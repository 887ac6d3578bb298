//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use wcs_sim::{FrameSnapshot, SimObserver, SimSummary};

use crate::writer::OutputWriter;
use crate::{FrameRow, OutputError, OutputResult};

/// A [`SimObserver`] that streams frames and the final summary to any
/// [`OutputWriter`] backend (CSV, SQLite).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, frame: &FrameSnapshot) {
        let rows = FrameRow::from_frame(frame);
        let result = self.writer.write_frame(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, summary: &SimSummary) {
        let result = self.writer.write_summary(summary);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}

//! CSV output backend.
//!
//! - The results file gains one row per run.  It is opened in append mode
//!   and the header is written only when the file is new or empty, so
//!   repeated runs build up a comparison table.
//! - The optional frame file is truncated on open and gets one row per
//!   entity per hour (see [`FRAME_HEADER`]).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use tracing::info;

use wcs_sim::SimSummary;

use crate::row::FRAME_HEADER;
use crate::writer::OutputWriter;
use crate::{FrameRow, OutputResult};

/// Writes run statistics, and optionally per-hour frames, to CSV files.
pub struct CsvWriter {
    results:  PathBuf,
    frames:   Option<Writer<File>>,
    finished: bool,
}

impl CsvWriter {
    /// Statistics only.  Nothing is touched on disk until the summary is
    /// written.
    pub fn new(results: &Path) -> Self {
        Self { results: results.to_path_buf(), frames: None, finished: false }
    }

    /// Also export frames to `path`, replacing any earlier file.
    pub fn with_frames(mut self, path: &Path) -> OutputResult<Self> {
        let mut frames = WriterBuilder::new().has_headers(false).from_path(path)?;
        frames.write_record(FRAME_HEADER)?;
        self.frames = Some(frames);
        Ok(self)
    }

    #[inline]
    pub fn results_path(&self) -> &Path {
        &self.results
    }
}

impl OutputWriter for CsvWriter {
    fn write_frame(&mut self, rows: &[FrameRow]) -> OutputResult<()> {
        let Some(frames) = self.frames.as_mut() else {
            return Ok(());
        };
        for row in rows {
            frames.serialize(row)?;
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &SimSummary) -> OutputResult<()> {
        let file = OpenOptions::new().create(true).append(true).open(&self.results)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new().has_headers(needs_header).from_writer(file);
        writer.serialize(summary)?;
        writer.flush()?;
        info!(path = %self.results.display(), "statistics saved");
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if let Some(frames) = self.frames.as_mut() {
            frames.flush()?;
        }
        Ok(())
    }
}

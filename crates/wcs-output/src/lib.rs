//! `wcs-output`: what a run leaves behind for people and other tools.
//!
//! | Item                  | Output                                                    |
//! |-----------------------|-----------------------------------------------------------|
//! | [`CsvWriter`]         | one row per run appended to `simulation_results.csv`; optional per-hour frame CSV |
//! | `SqliteWriter`        | same data in a database (feature `sqlite`)                |
//! | [`ConsoleReporter`]   | `Day d/D - Time HH:MM` status per hour, summary block at the end |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `wcs_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wcs_output::{ConsoleReporter, CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("simulation_results.csv"));
//! let mut obs = (ConsoleReporter::new(days), SimOutputObserver::new(writer));
//! sim.run(&mut obs).await;
//! obs.1.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod console;
pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use console::{ConsoleReporter, render_summary};
pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{FRAME_HEADER, FrameRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

//! SQLite output backend (feature `sqlite`).
//!
//! One database file with two tables: `simulation_results` (one row per
//! run, same columns as the CSV export) and `frames`.

use std::path::Path;

use rusqlite::Connection;

use wcs_sim::SimSummary;

use crate::writer::OutputWriter;
use crate::{FrameRow, OutputResult};

/// Writes run output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) the database at `path` and initialise the schema.
    /// Earlier runs are kept.
    pub fn new(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS simulation_results (
                 run_id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                 number_of_trucks         INTEGER NOT NULL,
                 number_of_bins           INTEGER NOT NULL,
                 bin_threshold            REAL    NOT NULL,
                 truck_waste_capacity     REAL    NOT NULL,
                 truck_waste_threshold    REAL    NOT NULL,
                 truck_fuel_capacity      REAL    NOT NULL,
                 truck_fuel_threshold     REAL    NOT NULL,
                 simulation_time          REAL    NOT NULL,
                 simulation_days          INTEGER NOT NULL,
                 total_collections        INTEGER NOT NULL,
                 total_distance           INTEGER NOT NULL,
                 total_fuel_used          REAL    NOT NULL,
                 total_waste_generated    REAL    NOT NULL,
                 total_overflow_incidents INTEGER NOT NULL,
                 total_traffic_events     INTEGER NOT NULL,
                 total_malfunctions       INTEGER NOT NULL,
                 total_refuel_count       INTEGER NOT NULL,
                 total_depot_returns      INTEGER NOT NULL,
                 total_mission_costs      REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS frames (
                 day               INTEGER NOT NULL,
                 hour              INTEGER NOT NULL,
                 kind              TEXT    NOT NULL,
                 id                TEXT    NOT NULL,
                 x                 INTEGER NOT NULL,
                 y                 INTEGER NOT NULL,
                 level_or_fuel     REAL    NOT NULL,
                 capacity_or_waste REAL    NOT NULL,
                 busy              INTEGER NOT NULL,
                 malfunctioned     INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_frame(&mut self, rows: &[FrameRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO frames \
                 (day, hour, kind, id, x, y, level_or_fuel, capacity_or_waste, busy, malfunctioned) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.day,
                    row.hour,
                    row.kind,
                    row.id,
                    row.x,
                    row.y,
                    row.level_or_fuel,
                    row.capacity_or_waste,
                    row.busy as i64,
                    row.malfunctioned as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_summary(&mut self, s: &SimSummary) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO simulation_results (
                 number_of_trucks, number_of_bins, bin_threshold,
                 truck_waste_capacity, truck_waste_threshold,
                 truck_fuel_capacity, truck_fuel_threshold,
                 simulation_time, simulation_days,
                 total_collections, total_distance, total_fuel_used,
                 total_waste_generated, total_overflow_incidents,
                 total_traffic_events, total_malfunctions,
                 total_refuel_count, total_depot_returns, total_mission_costs
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                       ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            rusqlite::params![
                s.number_of_trucks,
                s.number_of_bins,
                s.bin_threshold,
                s.truck_waste_capacity,
                s.truck_waste_threshold,
                s.truck_fuel_capacity,
                s.truck_fuel_threshold,
                s.simulation_time,
                s.simulation_days,
                s.total_collections as i64,
                s.total_distance as i64,
                s.total_fuel_used,
                s.total_waste_generated,
                s.total_overflow_incidents as i64,
                s.total_traffic_events as i64,
                s.total_malfunctions as i64,
                s.total_refuel_count as i64,
                s.total_depot_returns as i64,
                s.total_mission_costs,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

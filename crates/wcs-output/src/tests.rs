//! Tests for wcs-output.

use tempfile::TempDir;

use wcs_agents::{BinSnapshot, BinStats, TruckSnapshot, TruckStats};
use wcs_core::{BinId, Cell, SimTime, TruckId};
use wcs_sim::{FrameSnapshot, SimObserver, SimSummary};

use crate::writer::OutputWriter;
use crate::{ConsoleReporter, CsvWriter, FRAME_HEADER, FrameRow, SimOutputObserver, render_summary};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn tmp() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn summary(collections: u64) -> SimSummary {
    SimSummary {
        number_of_trucks:         3,
        number_of_bins:           8,
        bin_threshold:            0.8,
        truck_waste_capacity:     300.0,
        truck_waste_threshold:    0.8,
        truck_fuel_capacity:      100.0,
        truck_fuel_threshold:     0.2,
        simulation_time:          168.25,
        simulation_days:          7,
        total_collections:        collections,
        total_distance:           412,
        total_fuel_used:          206.0,
        total_waste_generated:    5120.5,
        total_overflow_incidents: 2,
        total_traffic_events:     9,
        total_malfunctions:       1,
        total_refuel_count:       4,
        total_depot_returns:      6,
        total_mission_costs:      88.75,
    }
}

fn frame(hour: u32, rush_hour: bool) -> FrameSnapshot {
    FrameSnapshot {
        time: SimTime::new(1, hour),
        depot: Cell::new(5, 5),
        fuel_stations: vec![Cell::new(0, 0), Cell::new(9, 9)],
        bins: vec![BinSnapshot {
            id:       BinId(0),
            position: Cell::new(2, 3),
            level:    42.5,
            capacity: 100.0,
            stats:    BinStats::default(),
        }],
        trucks: vec![TruckSnapshot {
            id:            TruckId(1),
            position:      Cell::new(4, 4),
            fuel:          77.0,
            waste:         30.0,
            busy:          true,
            malfunctioned: false,
            stats:         TruckStats::default(),
        }],
        active_events: 1,
        rush_hour,
    }
}

fn read_rows(path: &std::path::Path) -> (Vec<String>, Vec<::csv::StringRecord>) {
    let mut rdr = ::csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
    let rows = rdr.records().map(|r| r.unwrap()).collect();
    (headers, rows)
}

// ── Statistics CSV ────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use super::*;

    #[test]
    fn nothing_written_before_summary() {
        let dir = tmp();
        let path = dir.path().join("simulation_results.csv");
        let mut w = CsvWriter::new(&path);
        w.finish().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn header_matches_summary_columns() {
        let dir = tmp();
        let path = dir.path().join("simulation_results.csv");
        CsvWriter::new(&path).write_summary(&summary(5)).unwrap();

        let (headers, rows) = read_rows(&path);
        assert_eq!(headers, [
            "number_of_trucks", "number_of_bins", "bin_threshold",
            "truck_waste_capacity", "truck_waste_threshold",
            "truck_fuel_capacity", "truck_fuel_threshold",
            "simulation_time", "simulation_days",
            "total_collections", "total_distance", "total_fuel_used",
            "total_waste_generated", "total_overflow_incidents",
            "total_traffic_events", "total_malfunctions",
            "total_refuel_count", "total_depot_returns", "total_mission_costs",
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][9], "5");
        assert_eq!(&rows[0][18], "88.75");
    }

    #[test]
    fn later_runs_append_without_header() {
        let dir = tmp();
        let path = dir.path().join("simulation_results.csv");
        CsvWriter::new(&path).write_summary(&summary(1)).unwrap();
        CsvWriter::new(&path).write_summary(&summary(2)).unwrap();
        CsvWriter::new(&path).write_summary(&summary(3)).unwrap();

        let (headers, rows) = read_rows(&path);
        assert_eq!(headers[0], "number_of_trucks");
        let collections: Vec<&str> = rows.iter().map(|r| &r[9]).collect();
        assert_eq!(collections, ["1", "2", "3"]);
    }

    #[test]
    fn empty_existing_file_gets_header() {
        let dir = tmp();
        let path = dir.path().join("simulation_results.csv");
        std::fs::write(&path, "").unwrap();
        CsvWriter::new(&path).write_summary(&summary(4)).unwrap();

        let (headers, rows) = read_rows(&path);
        assert_eq!(headers.len(), 19);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn frames_written_with_header() {
        let dir = tmp();
        let results = dir.path().join("results.csv");
        let frames = dir.path().join("frames.csv");
        let mut w = CsvWriter::new(&results).with_frames(&frames).unwrap();
        w.write_frame(&FrameRow::from_frame(&frame(8, true))).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let (headers, rows) = read_rows(&frames);
        assert_eq!(headers, FRAME_HEADER);
        // depot, two stations, one bin, one truck
        assert_eq!(rows.len(), 5);
        assert_eq!(&rows[3][2], "bin");
        assert_eq!(&rows[3][3], "bin1");
        assert_eq!(&rows[3][6], "42.5");
        assert_eq!(&rows[4][3], "truck2");
        assert_eq!(&rows[4][8], "true");
    }

    #[test]
    fn frames_ignored_without_sink() {
        let dir = tmp();
        let mut w = CsvWriter::new(&dir.path().join("results.csv"));
        w.write_frame(&FrameRow::from_frame(&frame(8, false))).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use super::*;

    #[test]
    fn frame_flattens_in_kind_order() {
        let rows = FrameRow::from_frame(&frame(13, false));
        let kinds: Vec<&str> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, ["depot", "fuel_station", "fuel_station", "bin", "truck"]);
        assert!(rows.iter().all(|r| r.day == 1 && r.hour == 13));

        let truck = &rows[4];
        assert_eq!((truck.x, truck.y), (4, 4));
        assert_eq!(truck.level_or_fuel, 77.0);
        assert_eq!(truck.capacity_or_waste, 30.0);
        assert!(truck.busy);
        assert_eq!(rows[2].id, "station2");
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;

    use crate::{FrameRow, OutputResult};

    /// Fails every summary write, counts everything else.
    #[derive(Default)]
    struct Flaky {
        frames:   usize,
        finishes: usize,
    }

    impl OutputWriter for Flaky {
        fn write_frame(&mut self, _rows: &[FrameRow]) -> OutputResult<()> {
            self.frames += 1;
            Ok(())
        }

        fn write_summary(&mut self, _summary: &SimSummary) -> OutputResult<()> {
            Err(std::io::Error::other("disk full").into())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    #[test]
    fn summary_and_frames_reach_the_writer() {
        let dir = tmp();
        let results = dir.path().join("results.csv");
        let frames = dir.path().join("frames.csv");
        let writer = CsvWriter::new(&results).with_frames(&frames).unwrap();
        let mut obs = SimOutputObserver::new(writer);

        obs.on_tick_end(&frame(1, false));
        obs.on_tick_end(&frame(2, false));
        obs.on_sim_end(&summary(7));
        assert!(obs.take_error().is_none());

        assert_eq!(read_rows(&results).1.len(), 1);
        assert_eq!(read_rows(&frames).1.len(), 10);
    }

    #[test]
    fn write_error_stored_and_finish_still_runs() {
        let mut obs = SimOutputObserver::new(Flaky::default());
        obs.on_tick_end(&frame(1, false));
        obs.on_sim_end(&summary(0));

        let err = obs.take_error();
        assert!(err.is_some_and(|e| e.to_string().contains("disk full")));
        assert!(obs.take_error().is_none());

        let w = obs.into_writer();
        assert_eq!(w.frames, 1);
        assert_eq!(w.finishes, 1);
    }
}

// ── Console ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod console_tests {
    use super::*;

    #[test]
    fn status_line_formats_day_and_hour() {
        let r = ConsoleReporter::new(7);
        assert_eq!(r.status_line(11, &frame(12, false)), "Day 1/7 - Time 12:00");
        assert_eq!(r.status_line(24, &frame(1, false)), "Day 2/7 - Time 01:00 [night]");
    }

    #[test]
    fn night_and_rush_markers() {
        let r = ConsoleReporter::new(3);
        assert_eq!(r.status_line(19, &frame(20, false)), "Day 1/3 - Time 20:00 [night]");
        assert_eq!(r.status_line(5, &frame(6, false)), "Day 1/3 - Time 06:00 [night]");
        assert_eq!(r.status_line(7, &frame(8, true)), "Day 1/3 - Time 08:00 [rush hour]");
    }

    #[test]
    fn summary_block_lists_configuration_and_totals() {
        let text = render_summary(&summary(12));
        assert!(text.starts_with("====== Simulation Summary ======"));
        assert!(text.contains("Bin collection threshold: 80%"));
        assert!(text.contains("Truck fuel threshold: 20%"));
        assert!(text.contains("Total collections: 12"));
        assert!(text.contains("Total simulation time: 168.25 seconds"));
        assert!(text.contains("Total mission costs: 88.75"));
        assert_eq!(text.lines().count(), 21);
    }

    #[test]
    fn reporter_counts_ticks_across_days() {
        let mut r = ConsoleReporter::new(2);
        for h in 0..24 {
            r.on_tick_end(&frame((h + 1) % 24, false));
        }
        assert_eq!(r.status_line(24, &frame(1, false)), "Day 2/2 - Time 01:00 [night]");
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use super::*;

    use crate::SqliteWriter;

    #[test]
    fn runs_and_frames_land_in_tables() {
        let dir = tmp();
        let path = dir.path().join("output.db");
        let mut w = SqliteWriter::new(&path).unwrap();
        w.write_frame(&FrameRow::from_frame(&frame(3, false))).unwrap();
        w.write_summary(&summary(2)).unwrap();
        w.write_summary(&summary(5)).unwrap();
        w.finish().unwrap();
        drop(w);

        let conn = rusqlite::Connection::open(&path).unwrap();
        let runs: i64 = conn.query_row("SELECT COUNT(*) FROM simulation_results", [], |r| r.get(0)).unwrap();
        let total: i64 = conn.query_row("SELECT SUM(total_collections) FROM simulation_results", [], |r| r.get(0)).unwrap();
        let frames: i64 = conn.query_row("SELECT COUNT(*) FROM frames", [], |r| r.get(0)).unwrap();
        assert_eq!((runs, total, frames), (2, 7, 5));
    }
}

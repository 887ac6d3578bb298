//! Plain data row types written by output backends.

use serde::Serialize;

use wcs_sim::FrameSnapshot;

/// Column names of the frame export, in order.
pub const FRAME_HEADER: [&str; 10] =
    ["day", "hour", "kind", "id", "x", "y", "level_or_fuel", "capacity_or_waste", "busy", "malfunctioned"];

/// One entity of one hour, flattened for replay by an external renderer.
///
/// Bins carry `(level, capacity)` in the two value columns, trucks carry
/// `(fuel, waste)`.  Facilities are static and written once per hour so a
/// replay never needs the config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRow {
    pub day:               u32,
    pub hour:              u32,
    pub kind:              &'static str,
    pub id:                String,
    pub x:                 i32,
    pub y:                 i32,
    pub level_or_fuel:     f64,
    pub capacity_or_waste: f64,
    pub busy:              bool,
    pub malfunctioned:     bool,
}

impl FrameRow {
    /// Flatten a frame: depot, fuel stations, bins, then trucks.
    pub fn from_frame(frame: &FrameSnapshot) -> Vec<FrameRow> {
        let (day, hour) = (frame.time.day, frame.time.hour);
        let fixed = |kind: &'static str, id: String, x: i32, y: i32| FrameRow {
            day,
            hour,
            kind,
            id,
            x,
            y,
            level_or_fuel: 0.0,
            capacity_or_waste: 0.0,
            busy: false,
            malfunctioned: false,
        };

        let mut rows = Vec::with_capacity(1 + frame.fuel_stations.len() + frame.bins.len() + frame.trucks.len());
        rows.push(fixed("depot", "depot".to_owned(), frame.depot.x, frame.depot.y));
        for (i, station) in frame.fuel_stations.iter().enumerate() {
            rows.push(fixed("fuel_station", format!("station{}", i + 1), station.x, station.y));
        }
        for bin in &frame.bins {
            rows.push(FrameRow {
                level_or_fuel: bin.level,
                capacity_or_waste: bin.capacity,
                ..fixed("bin", bin.id.to_string(), bin.position.x, bin.position.y)
            });
        }
        for truck in &frame.trucks {
            rows.push(FrameRow {
                level_or_fuel: truck.fuel,
                capacity_or_waste: truck.waste,
                busy: truck.busy,
                malfunctioned: truck.malfunctioned,
                ..fixed("truck", truck.id.to_string(), truck.position.x, truck.position.y)
            });
        }
        rows
    }
}

use serde::Serialize;

use wcs_agents::{BinSnapshot, TruckSnapshot};
use wcs_core::{Cell, SimTime};

/// Everything a renderer needs to draw one hour.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub time:          SimTime,
    pub depot:         Cell,
    pub fuel_stations: Vec<Cell>,
    pub bins:          Vec<BinSnapshot>,
    pub trucks:        Vec<TruckSnapshot>,
    pub active_events: usize,
    pub rush_hour:     bool,
}

//! Traffic disruptions.

use std::fmt;

use wcs_core::{Cell, SimConfig};

/// The two kinds of random disruption.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrafficEventKind {
    Accident,
    Roadwork,
}

impl TrafficEventKind {
    pub const ALL: [TrafficEventKind; 2] = [TrafficEventKind::Accident, TrafficEventKind::Roadwork];

    pub fn as_str(self) -> &'static str {
        match self {
            TrafficEventKind::Accident => "accident",
            TrafficEventKind::Roadwork => "roadwork",
        }
    }

    /// Per-tick chance of a new event of this kind during daytime.
    pub fn probability(self, config: &SimConfig) -> f64 {
        match self {
            TrafficEventKind::Accident => config.random_events.accident_probability,
            TrafficEventKind::Roadwork => config.random_events.roadwork_probability,
        }
    }

    /// Fixed travel-cost multiplier near an event of this kind.
    pub fn multiplier(self, config: &SimConfig) -> f64 {
        match self {
            TrafficEventKind::Accident => config.traffic_events.accident.traffic_multiplier,
            TrafficEventKind::Roadwork => config.traffic_events.roadwork.traffic_multiplier,
        }
    }
}

impl fmt::Display for TrafficEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active disruption.  Stored events always have `remaining_hours > 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficEvent {
    pub kind:            TrafficEventKind,
    pub position:        Cell,
    pub remaining_hours: u32,
    pub multiplier:      f64,
}

impl TrafficEvent {
    /// `true` if `cell` is within `radius` grid distance of the event.
    #[inline]
    pub fn affects(&self, cell: Cell, radius: u32) -> bool {
        self.position.manhattan(cell) <= radius
    }
}

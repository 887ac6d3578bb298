//! Per-agent counters aggregated into the end-of-run summary.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BinStats {
    /// Completed collections reported by trucks.
    pub collections:        u64,
    /// Sum of every fill increment drawn, before capping at capacity.
    pub waste_generated:    f64,
    /// Fill updates that left the bin at capacity.
    pub overflow_incidents: u64,
    /// Sum of winning (rounded) costs over every auction this bin awarded.
    pub mission_costs:      f64,
    /// Auctions opened, retries included.
    pub auctions:           u64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TruckStats {
    pub collections:     u64,
    /// Grid cells travelled (Manhattan length of every leg).
    pub distance:        u64,
    /// Fuel burned by travel.
    pub fuel_used:       f64,
    pub fuel_refilled:   f64,
    pub refuels:         u64,
    pub depot_returns:   u64,
    pub malfunctions:    u64,
    pub waste_collected: f64,
    /// Simulated hours spent on missions.
    pub busy_hours:      u64,
}

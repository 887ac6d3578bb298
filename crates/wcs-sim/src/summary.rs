//! End-of-run aggregate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use wcs_agents::{BinSnapshot, TruckSnapshot};
use wcs_core::SimConfig;

/// One row of the results table.
///
/// Field order is the column order of the exported statistics.  The first
/// seven fields echo the configuration the run used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimSummary {
    pub number_of_trucks:         u32,
    pub number_of_bins:           u32,
    pub bin_threshold:            f64,
    pub truck_waste_capacity:     f64,
    pub truck_waste_threshold:    f64,
    pub truck_fuel_capacity:      f64,
    pub truck_fuel_threshold:     f64,
    /// Wall-clock seconds the run took.
    pub simulation_time:          f64,
    pub simulation_days:          u32,
    pub total_collections:        u64,
    pub total_distance:           u64,
    pub total_fuel_used:          f64,
    pub total_waste_generated:    f64,
    pub total_overflow_incidents: u64,
    pub total_traffic_events:     u64,
    pub total_malfunctions:       u64,
    pub total_refuel_count:       u64,
    pub total_depot_returns:      u64,
    pub total_mission_costs:      f64,
}

impl SimSummary {
    /// Sum per-agent counters.  Collections are counted on the truck side.
    pub fn aggregate(
        config:         &SimConfig,
        bins:           &[BinSnapshot],
        trucks:         &[TruckSnapshot],
        traffic_events: u64,
        elapsed:        Duration,
    ) -> Self {
        let agents = &config.agents;
        Self {
            number_of_trucks:         agents.counts.trucks,
            number_of_bins:           agents.counts.bins,
            bin_threshold:            agents.bin.threshold,
            truck_waste_capacity:     agents.truck.waste.capacity,
            truck_waste_threshold:    agents.truck.waste.threshold,
            truck_fuel_capacity:      agents.truck.fuel.capacity,
            truck_fuel_threshold:     agents.truck.fuel.threshold,
            simulation_time:          elapsed.as_secs_f64(),
            simulation_days:          config.simulation.days,
            total_collections:        trucks.iter().map(|t| t.stats.collections).sum(),
            total_distance:           trucks.iter().map(|t| t.stats.distance).sum(),
            total_fuel_used:          trucks.iter().map(|t| t.stats.fuel_used).sum(),
            total_waste_generated:    bins.iter().map(|b| b.stats.waste_generated).sum(),
            total_overflow_incidents: bins.iter().map(|b| b.stats.overflow_incidents).sum(),
            total_traffic_events:     traffic_events,
            total_malfunctions:       trucks.iter().map(|t| t.stats.malfunctions).sum(),
            total_refuel_count:       trucks.iter().map(|t| t.stats.refuels).sum(),
            total_depot_returns:      trucks.iter().map(|t| t.stats.depot_returns).sum(),
            total_mission_costs:      bins.iter().map(|b| b.stats.mission_costs).sum(),
        }
    }
}

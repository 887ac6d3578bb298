//! Human-readable progress and summary, through `tracing`.

use std::fmt::Write as _;

use tracing::info;

use wcs_core::time::HOURS_PER_DAY;
use wcs_sim::{FrameSnapshot, SimObserver, SimSummary};

/// Logs one status line per simulated hour and a summary block at the end.
///
/// ```text
/// Day 1/7 - Time 21:00 [night]
/// Day 2/7 - Time 08:00 [rush hour]
/// ```
pub struct ConsoleReporter {
    days:  u32,
    ticks: u64,
}

impl ConsoleReporter {
    pub fn new(days: u32) -> Self {
        Self { days, ticks: 0 }
    }

    /// Status line for the `tick`-th hour (0-based) of the run.
    pub fn status_line(&self, tick: u64, frame: &FrameSnapshot) -> String {
        let day = tick / HOURS_PER_DAY as u64 + 1;
        let hour = frame.time.hour;
        let mut line = format!("Day {day}/{} - Time {hour:02}:00", self.days);
        if is_night(hour) {
            line.push_str(" [night]");
        }
        if frame.rush_hour {
            line.push_str(" [rush hour]");
        }
        line
    }
}

/// The display's night band, wider than the hours that slow bin filling.
#[inline]
fn is_night(hour: u32) -> bool {
    hour >= 20 || hour <= 6
}

impl SimObserver for ConsoleReporter {
    fn on_tick_end(&mut self, frame: &FrameSnapshot) {
        let line = self.status_line(self.ticks, frame);
        self.ticks += 1;
        info!(
            active_events = frame.active_events,
            busy_trucks = frame.trucks.iter().filter(|t| t.busy).count(),
            "{line}"
        );
    }

    fn on_sim_end(&mut self, summary: &SimSummary) {
        info!("{}", render_summary(summary));
    }
}

/// Multi-line summary block, configuration first.
pub fn render_summary(s: &SimSummary) -> String {
    let mut out = String::from("====== Simulation Summary ======\n");
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Configuration:");
    let _ = writeln!(out, "  Number of trucks: {}", s.number_of_trucks);
    let _ = writeln!(out, "  Number of bins: {}", s.number_of_bins);
    let _ = writeln!(out, "  Bin collection threshold: {}%", percent(s.bin_threshold));
    let _ = writeln!(out, "  Truck waste capacity: {} units", s.truck_waste_capacity);
    let _ = writeln!(out, "  Truck waste threshold: {}%", percent(s.truck_waste_threshold));
    let _ = writeln!(out, "  Truck fuel capacity: {}L", s.truck_fuel_capacity);
    let _ = writeln!(out, "  Truck fuel threshold: {}%", percent(s.truck_fuel_threshold));
    let _ = writeln!(out, "Performance:");
    let _ = writeln!(out, "  Total simulation time: {:.2} seconds", s.simulation_time);
    let _ = writeln!(out, "  Total collections: {}", s.total_collections);
    let _ = writeln!(out, "  Total distance traveled: {} units", s.total_distance);
    let _ = writeln!(out, "  Total fuel used: {:.2}L", s.total_fuel_used);
    let _ = writeln!(out, "  Total mission costs: {:.2}", s.total_mission_costs);
    let _ = writeln!(out, "  Total waste generated: {:.2}", s.total_waste_generated);
    let _ = writeln!(out, "  Total overflow incidents: {}", s.total_overflow_incidents);
    let _ = writeln!(out, "  Total traffic events: {}", s.total_traffic_events);
    let _ = writeln!(out, "  Total truck malfunctions: {}", s.total_malfunctions);
    let _ = writeln!(out, "  Total refueling stops: {}", s.total_refuel_count);
    let _ = write!(out, "  Total depot returns: {}", s.total_depot_returns);
    out
}

#[inline]
fn percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 100.0).round() / 100.0
}

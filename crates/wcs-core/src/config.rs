//! Simulation configuration.
//!
//! Loaded once at startup from a TOML file and shared read-only (behind an
//! `Arc`) by the world and every agent.  Every field has a default, so an
//! empty file, or no file at all, yields a runnable city.
//!
//! ```toml
//! [grid]
//! size = 10
//!
//! [locations]
//! depot = [5, 5]
//! fuel_stations = [[0, 0], [9, 9]]
//!
//! [agents.counts]
//! bins = 8
//! trucks = 3
//!
//! [agents.truck.fuel]
//! capacity = 100.0
//! consumption = 0.5
//! threshold = 0.2
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Cell, CoreError, CoreResult, HourWindow};

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub grid:           GridConfig,
    pub locations:      LocationsConfig,
    pub agents:         AgentsConfig,
    pub time:           TimeConfig,
    pub random_events:  RandomEventsConfig,
    pub traffic_events: TrafficEventsConfig,
    pub protocol:       ProtocolConfig,
    pub simulation:     SimulationConfig,
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Side length of the square grid, in cells.
    pub size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { size: 10 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationsConfig {
    pub depot:         Cell,
    pub fuel_stations: Vec<Cell>,
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            depot:         Cell::new(5, 5),
            fuel_stations: vec![Cell::new(0, 0), Cell::new(9, 9)],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentsConfig {
    pub counts: CountsConfig,
    pub bin:    BinConfig,
    pub truck:  TruckConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountsConfig {
    pub bins:   u32,
    pub trucks: u32,
}

impl Default for CountsConfig {
    fn default() -> Self {
        Self { bins: 8, trucks: 3 }
    }
}

/// Closed interval `[min, max]` of real values.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

/// Closed interval `[min, max]` of whole hours.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinConfig {
    /// Real seconds between fill checks (the periodic behaviour's period).
    pub monitor_period_secs: f64,
    pub capacity:            f64,
    /// Fraction of capacity at which a CFP is issued.
    pub threshold:           f64,
    /// Waste added per fill check, before the night-time halving.
    pub fill_rate:           FloatRange,
    /// Minimum Chebyshev distance between any two bins.
    pub min_distance:        u32,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            monitor_period_secs: 1.0,
            capacity:            100.0,
            threshold:           0.8,
            fill_rate:           FloatRange { min: 5.0, max: 15.0 },
            min_distance:        2,
        }
    }
}

impl BinConfig {
    pub fn monitor_period(&self) -> Duration {
        secs(self.monitor_period_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TruckConfig {
    /// Grid cells travelled per simulated hour.
    pub speed:       f64,
    pub fuel:        FuelConfig,
    pub waste:       WasteConfig,
    pub malfunction: MalfunctionConfig,
}

impl Default for TruckConfig {
    fn default() -> Self {
        Self {
            speed:       5.0,
            fuel:        FuelConfig::default(),
            waste:       WasteConfig::default(),
            malfunction: MalfunctionConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelConfig {
    pub capacity:    f64,
    /// Fuel burned per unit of travel cost.
    pub consumption: f64,
    /// Fraction of capacity below which a mission starts with a refuel.
    pub threshold:   f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self { capacity: 100.0, consumption: 0.5, threshold: 0.2 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WasteConfig {
    pub capacity:  f64,
    /// Fraction of capacity at which the truck heads back to the depot.
    pub threshold: f64,
}

impl Default for WasteConfig {
    fn default() -> Self {
        Self { capacity: 300.0, threshold: 0.8 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MalfunctionConfig {
    /// Chance that a mission aborts with a breakdown at its start.
    pub probability: f64,
    /// Repair time in simulated hours.
    pub duration:    FloatRange,
}

impl Default for MalfunctionConfig {
    fn default() -> Self {
        Self { probability: 0.05, duration: FloatRange { min: 2.0, max: 6.0 } }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    /// Wall-clock seconds per simulated hour.
    pub real_seconds_per_hour: f64,
    pub rush_hours:            RushHoursConfig,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self { real_seconds_per_hour: 1.0, rush_hours: RushHoursConfig::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RushHoursConfig {
    pub morning: RushWindow,
    pub evening: RushWindow,
}

impl Default for RushHoursConfig {
    fn default() -> Self {
        Self {
            morning: RushWindow { start: 7,  end: 9,  traffic_multiplier: 1.5 },
            evening: RushWindow { start: 17, end: 19, traffic_multiplier: 1.5 },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RushWindow {
    pub start:              u32,
    pub end:                u32,
    pub traffic_multiplier: f64,
}

impl RushWindow {
    #[inline]
    pub fn window(self) -> HourWindow {
        HourWindow::new(self.start, self.end)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomEventsConfig {
    pub accident_probability: f64,
    pub roadwork_probability: f64,
    /// Event lifetime in simulated hours.
    pub duration:             HourRange,
    /// Hours of the day during which new events may appear.
    pub daytime:              HourWindow,
    /// Grid distance within which an event slows travel.
    pub radius:               u32,
}

impl Default for RandomEventsConfig {
    fn default() -> Self {
        Self {
            accident_probability: 0.05,
            roadwork_probability: 0.02,
            duration:             HourRange { min: 2, max: 4 },
            daytime:              HourWindow::new(6, 20),
            radius:               2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrafficEventsConfig {
    pub accident: EventTypeConfig,
    pub roadwork: EventTypeConfig,
}

impl Default for TrafficEventsConfig {
    fn default() -> Self {
        Self {
            accident: EventTypeConfig { traffic_multiplier: 2.0 },
            roadwork: EventTypeConfig { traffic_multiplier: 1.5 },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventTypeConfig {
    pub traffic_multiplier: f64,
}

/// Wall-clock bounds of the negotiation protocol.  These are independent of
/// the simulated hour length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolConfig {
    pub proposal_timeout_secs:  f64,
    pub receive_timeout_secs:   f64,
    pub retry_delay_secs:       f64,
    pub collection_delay_secs:  f64,
    pub unload_delay_secs:      f64,
    pub refuel_delay_secs:      f64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            proposal_timeout_secs: 5.0,
            receive_timeout_secs:  10.0,
            retry_delay_secs:      1.0,
            collection_delay_secs: 1.0,
            unload_delay_secs:     2.0,
            refuel_delay_secs:     1.0,
        }
    }
}

impl ProtocolConfig {
    pub fn proposal_timeout(&self) -> Duration { secs(self.proposal_timeout_secs) }
    pub fn receive_timeout(&self) -> Duration { secs(self.receive_timeout_secs) }
    pub fn retry_delay(&self) -> Duration { secs(self.retry_delay_secs) }
    pub fn collection_delay(&self) -> Duration { secs(self.collection_delay_secs) }
    pub fn unload_delay(&self) -> Duration { secs(self.unload_delay_secs) }
    pub fn refuel_delay(&self) -> Duration { secs(self.refuel_delay_secs) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub days:      u32,
    /// Seed for bootstrap placement.  The same seed always lays out the
    /// same city.
    pub seed:      u64,
    /// Seed for the live run.  `None` draws from OS entropy.
    pub live_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { days: 7, seed: 8, live_seed: None }
    }
}

#[inline]
fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s.max(0.0))
}

// ── Loading and validation ────────────────────────────────────────────────────

impl SimConfig {
    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&content).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: SimConfig = toml::from_str(text).map_err(|source| CoreError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Total simulated hours in the run (`days × 24`).
    #[inline]
    pub fn total_hours(&self) -> u64 {
        self.simulation.days as u64 * crate::time::HOURS_PER_DAY as u64
    }

    /// Wall-clock length of one simulated hour.
    #[inline]
    pub fn hour_duration(&self) -> Duration {
        secs(self.time.real_seconds_per_hour)
    }

    /// Absolute fuel level below which a truck refuels before a mission.
    #[inline]
    pub fn fuel_threshold_level(&self) -> f64 {
        self.agents.truck.fuel.capacity * self.agents.truck.fuel.threshold
    }

    /// Absolute waste load at which a truck returns to the depot.
    #[inline]
    pub fn waste_threshold_level(&self) -> f64 {
        self.agents.truck.waste.capacity * self.agents.truck.waste.threshold
    }

    /// Check every invariant the simulation relies on.
    pub fn validate(&self) -> CoreResult<()> {
        let size = self.grid.size;
        ensure(size > 0, "grid.size must be positive")?;
        ensure(self.locations.depot.within(size), "locations.depot lies outside the grid")?;
        ensure(!self.locations.fuel_stations.is_empty(), "at least one fuel station is required")?;
        for station in &self.locations.fuel_stations {
            ensure(station.within(size), &format!("fuel station {station} lies outside the grid"))?;
        }

        let counts = &self.agents.counts;
        ensure(counts.bins > 0, "agents.counts.bins must be positive")?;
        ensure(counts.trucks > 0, "agents.counts.trucks must be positive")?;

        let bin = &self.agents.bin;
        ensure(positive(bin.capacity), "agents.bin.capacity must be positive")?;
        ensure(fraction(bin.threshold), "agents.bin.threshold must lie in (0, 1]")?;
        ensure(positive(bin.monitor_period_secs), "agents.bin.monitor_period_secs must be positive")?;
        ensure_range(bin.fill_rate, "agents.bin.fill_rate")?;

        let truck = &self.agents.truck;
        ensure(positive(truck.speed), "agents.truck.speed must be positive")?;
        ensure(positive(truck.fuel.capacity), "agents.truck.fuel.capacity must be positive")?;
        ensure(truck.fuel.consumption.is_finite() && truck.fuel.consumption >= 0.0, "agents.truck.fuel.consumption must not be negative")?;
        ensure(fraction(truck.fuel.threshold), "agents.truck.fuel.threshold must lie in (0, 1]")?;
        ensure(positive(truck.waste.capacity), "agents.truck.waste.capacity must be positive")?;
        ensure(fraction(truck.waste.threshold), "agents.truck.waste.threshold must lie in (0, 1]")?;
        ensure(probability(truck.malfunction.probability), "agents.truck.malfunction.probability must lie in [0, 1]")?;
        ensure_range(truck.malfunction.duration, "agents.truck.malfunction.duration")?;

        ensure(
            self.time.real_seconds_per_hour.is_finite() && self.time.real_seconds_per_hour >= 0.0,
            "time.real_seconds_per_hour must be a non-negative number",
        )?;
        for (name, rush) in [("morning", self.time.rush_hours.morning), ("evening", self.time.rush_hours.evening)] {
            ensure(rush.start <= rush.end && rush.end < 24, &format!("time.rush_hours.{name} is not a valid hour window"))?;
            ensure(positive(rush.traffic_multiplier), &format!("time.rush_hours.{name}.traffic_multiplier must be positive"))?;
        }

        let events = &self.random_events;
        ensure(probability(events.accident_probability), "random_events.accident_probability must lie in [0, 1]")?;
        ensure(probability(events.roadwork_probability), "random_events.roadwork_probability must lie in [0, 1]")?;
        ensure(
            events.duration.min >= 1 && events.duration.min <= events.duration.max,
            "random_events.duration must satisfy 1 <= min <= max",
        )?;
        ensure(
            events.daytime.start <= events.daytime.end && events.daytime.end < 24,
            "random_events.daytime is not a valid hour window",
        )?;
        ensure(positive(self.traffic_events.accident.traffic_multiplier), "traffic_events.accident.traffic_multiplier must be positive")?;
        ensure(positive(self.traffic_events.roadwork.traffic_multiplier), "traffic_events.roadwork.traffic_multiplier must be positive")?;

        let p = &self.protocol;
        for (name, v) in [
            ("proposal_timeout_secs", p.proposal_timeout_secs),
            ("receive_timeout_secs",  p.receive_timeout_secs),
            ("retry_delay_secs",      p.retry_delay_secs),
            ("collection_delay_secs", p.collection_delay_secs),
            ("unload_delay_secs",     p.unload_delay_secs),
            ("refuel_delay_secs",     p.refuel_delay_secs),
        ] {
            ensure(v.is_finite() && v >= 0.0, &format!("protocol.{name} must be a non-negative number"))?;
        }
        ensure(positive(p.receive_timeout_secs), "protocol.receive_timeout_secs must be positive")?;

        ensure(self.simulation.days > 0, "simulation.days must be positive")?;
        Ok(())
    }
}

fn ensure(cond: bool, msg: &str) -> CoreResult<()> {
    if cond { Ok(()) } else { Err(CoreError::Config(msg.to_owned())) }
}

fn ensure_range(r: FloatRange, name: &str) -> CoreResult<()> {
    ensure(
        r.min >= 0.0 && r.min <= r.max && r.max.is_finite(),
        &format!("{name} must satisfy 0 <= min <= max"),
    )
}

/// Finite and strictly above zero.
#[inline]
fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[inline]
fn fraction(v: f64) -> bool {
    v > 0.0 && v <= 1.0
}

#[inline]
fn probability(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

//! The `World` owner and its read-only `WorldView`.

use std::sync::Arc;

use tracing::info;

use wcs_core::config::RushHoursConfig;
use wcs_core::{Cell, SimConfig, SimRng, SimTime};

use crate::{GridMap, TrafficEvent, TrafficEventKind, WorldClock};

// ── WorldView ─────────────────────────────────────────────────────────────────

/// An immutable snapshot of the world at one simulated hour.
///
/// Cheap to clone: the map is shared and the event list is short.  This is
/// the only world type agents ever see.
#[derive(Clone, Debug)]
pub struct WorldView {
    pub time:   SimTime,
    pub map:    Arc<GridMap>,
    pub events: Vec<TrafficEvent>,
    rush:       RushHoursConfig,
    radius:     u32,
}

impl WorldView {
    pub fn new(time: SimTime, map: Arc<GridMap>, config: &SimConfig) -> Self {
        Self {
            time,
            map,
            events: Vec::new(),
            rush:   config.time.rush_hours.clone(),
            radius: config.random_events.radius,
        }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.time
    }

    #[inline]
    pub fn depot(&self) -> Cell {
        self.map.depot
    }

    /// Pure function of the hour: inside either configured rush window.
    pub fn is_rush_hour(&self) -> bool {
        self.rush.morning.window().contains(self.time.hour)
            || self.rush.evening.window().contains(self.time.hour)
    }

    /// 1.0 outside rush hours, otherwise the active window's multiplier.
    pub fn rush_hour_multiplier(&self) -> f64 {
        let hour = self.time.hour;
        if self.rush.morning.window().contains(hour) {
            self.rush.morning.traffic_multiplier
        } else if self.rush.evening.window().contains(hour) {
            self.rush.evening.traffic_multiplier
        } else {
            1.0
        }
    }

    /// Largest multiplier among events within the influence radius of
    /// `cell`, or 1.0 if none are in range.  Taking the maximum keeps the
    /// result independent of event order.
    pub fn event_multiplier(&self, cell: Cell) -> f64 {
        self.events
            .iter()
            .filter(|e| e.affects(cell, self.radius))
            .map(|e| e.multiplier)
            .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.max(m))))
            .unwrap_or(1.0)
    }

    /// Manhattan distance scaled by the worst of the rush-hour multiplier and
    /// the event multipliers at either endpoint.
    pub fn travel_cost(&self, from: Cell, to: Cell) -> f64 {
        let base = from.manhattan(to) as f64;
        let events = self.event_multiplier(from).max(self.event_multiplier(to));
        base * self.rush_hour_multiplier().max(events)
    }

    /// The fuel station cheapest to reach from `from`, with that cost.
    /// Ties go to the first configured station.
    pub fn nearest_fuel_station(&self, from: Cell) -> Option<(Cell, f64)> {
        self.map
            .fuel_stations
            .iter()
            .map(|&s| (s, self.travel_cost(from, s)))
            .fold(None, |best, (s, cost)| match best {
                Some((_, best_cost)) if best_cost <= cost => best,
                _ => Some((s, cost)),
            })
    }
}

// ── StepReport ────────────────────────────────────────────────────────────────

/// What changed during one [`World::step_hour`].
#[derive(Clone, Debug, Default)]
pub struct StepReport {
    pub time:       SimTime,
    pub expired:    usize,
    pub new_events: Vec<TrafficEvent>,
}

// ── World ─────────────────────────────────────────────────────────────────────

/// The mutable world: clock, active traffic events, and the RNG that spawns
/// them.  Owned solely by the orchestrator.
pub struct World {
    config:       Arc<SimConfig>,
    clock:        WorldClock,
    view:         WorldView,
    total_events: u64,
    rng:          SimRng,
}

impl World {
    pub fn new(config: Arc<SimConfig>, rng: SimRng) -> Self {
        let map = Arc::new(GridMap::from_config(&config));
        let clock = WorldClock::new();
        let view = WorldView::new(clock.now(), map, &config);
        Self { config, clock, view, total_events: 0, rng }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    #[inline]
    pub fn map(&self) -> &Arc<GridMap> {
        &self.view.map
    }

    /// The current read-only snapshot.
    #[inline]
    pub fn view(&self) -> &WorldView {
        &self.view
    }

    #[inline]
    pub fn travel_cost(&self, from: Cell, to: Cell) -> f64 {
        self.view.travel_cost(from, to)
    }

    #[inline]
    pub fn is_rush_hour(&self) -> bool {
        self.view.is_rush_hour()
    }

    /// Events created since the start of the run.
    #[inline]
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    #[inline]
    pub fn active_events(&self) -> &[TrafficEvent] {
        &self.view.events
    }

    /// Insert an event directly (tests and scripted scenarios).
    pub fn add_event(&mut self, event: TrafficEvent) {
        self.view.events.push(event);
        self.total_events += 1;
    }

    /// Advance one simulated hour.
    ///
    /// 1. Advance the clock (rolling the day over at 24).
    /// 2. Age every event by one hour and drop those that reach zero.
    /// 3. During the daytime window, roll one Bernoulli trial per event kind
    ///    and place each new event on a random non-facility cell.
    pub fn step_hour(&mut self) -> StepReport {
        let time = self.clock.tick();
        self.view.time = time;

        let before = self.view.events.len();
        for event in &mut self.view.events {
            event.remaining_hours = event.remaining_hours.saturating_sub(1);
        }
        self.view.events.retain(|e| e.remaining_hours > 0);
        let expired = before - self.view.events.len();

        let mut new_events = Vec::new();
        if self.config.random_events.daytime.contains(time.hour) {
            for kind in TrafficEventKind::ALL {
                if self.rng.gen_bool(kind.probability(&self.config)) {
                    if let Some(event) = self.spawn_event(kind) {
                        info!(
                            kind = kind.as_str(),
                            position = %event.position,
                            duration = event.remaining_hours,
                            multiplier = event.multiplier,
                            "New traffic event",
                        );
                        new_events.push(event.clone());
                        self.add_event(event);
                    }
                }
            }
        }

        StepReport { time, expired, new_events }
    }

    fn spawn_event(&mut self, kind: TrafficEventKind) -> Option<TrafficEvent> {
        let position = self.view.map.random_free_cell(&mut self.rng)?;
        let d = self.config.random_events.duration;
        Some(TrafficEvent {
            kind,
            position,
            remaining_hours: self.rng.gen_range(d.min..=d.max),
            multiplier:      kind.multiplier(&self.config),
        })
    }
}

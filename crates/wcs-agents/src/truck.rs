//! Collection-truck state: bidding, fuel, load, repair and utilisation.
//!
//! A truck is in exactly one of three situations:
//!
//! | State           | Condition                 | Answer to a CFP            |
//! |-----------------|---------------------------|----------------------------|
//! | `Malfunctioned` | `repair_due.is_some()`    | `refuse(MALFUNCTIONED)`    |
//! | `Busy`          | `busy`                    | `refuse(BUSY)`             |
//! | `Available`     | otherwise                 | `propose(cost)` or refusal |
//!
//! Invariant: `busy` implies `current_bin.is_some()`.

use std::sync::Arc;

use tracing::{debug, info};

use wcs_core::{AgentRng, BinId, Cell, DueTime, SimConfig, SimTime, TruckId};
use wcs_fabric::{CallForProposals, Payload, RefuseReason};
use wcs_world::WorldView;

use crate::{MissionError, TruckStats};

pub struct TruckState {
    id:            TruckId,
    config:        Arc<SimConfig>,
    position:      Cell,
    fuel:          f64,
    waste:         f64,
    busy:          bool,
    current_bin:   Option<BinId>,
    repair_due:    Option<DueTime>,
    service_start: Option<SimTime>,
    rng:           AgentRng,
    stats:         TruckStats,
}

impl TruckState {
    /// A fresh truck parked at the depot with a full tank and empty hopper.
    pub fn new(id: TruckId, config: Arc<SimConfig>, rng: AgentRng) -> Self {
        let position = config.locations.depot;
        let fuel = config.agents.truck.fuel.capacity;
        Self {
            id,
            config,
            position,
            fuel,
            waste: 0.0,
            busy: false,
            current_bin: None,
            repair_due: None,
            service_start: None,
            rng,
            stats: TruckStats::default(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> TruckId { self.id }
    #[inline] pub fn position(&self) -> Cell { self.position }
    #[inline] pub fn fuel(&self) -> f64 { self.fuel }
    #[inline] pub fn waste(&self) -> f64 { self.waste }
    #[inline] pub fn is_busy(&self) -> bool { self.busy }
    #[inline] pub fn current_bin(&self) -> Option<BinId> { self.current_bin }
    #[inline] pub fn repair_due(&self) -> Option<DueTime> { self.repair_due }
    #[inline] pub fn is_malfunctioned(&self) -> bool { self.repair_due.is_some() }
    #[inline] pub fn stats(&self) -> &TruckStats { &self.stats }
    #[inline] pub fn config(&self) -> &SimConfig { &self.config }

    /// Overwrite position, fuel and load.  Used to stage scenarios.
    pub fn set_condition(&mut self, position: Cell, fuel: f64, waste: f64) {
        self.position = position;
        self.fuel = fuel.clamp(0.0, self.config.agents.truck.fuel.capacity);
        self.waste = waste.clamp(0.0, self.config.agents.truck.waste.capacity);
    }

    // ── Repair ────────────────────────────────────────────────────────────

    /// Clear the malfunction once `now` has reached the repair deadline.
    /// Returns `true` on the transition back to available.
    pub fn check_repair(&mut self, now: SimTime) -> bool {
        match self.repair_due {
            Some(due) if due.reached_by(now) => {
                self.repair_due = None;
                info!(truck = %self.id, %now, "repaired");
                true
            }
            Some(due) => {
                debug!(truck = %self.id, remaining = due.remaining_from(now), "still under repair");
                false
            }
            None => false,
        }
    }

    /// Hours of repair left, or `None` if the truck is operational.
    pub fn repair_remaining(&self, now: SimTime) -> Option<f64> {
        self.repair_due.map(|due| due.remaining_from(now))
    }

    /// Roll for a breakdown at mission start.  On failure the truck is
    /// towed to the depot and a repair deadline is set; the sampled repair
    /// duration in hours is returned.
    pub fn roll_malfunction(&mut self, now: SimTime) -> Option<f64> {
        let m = &self.config.agents.truck.malfunction;
        if self.is_malfunctioned() || !self.rng.gen_bool(m.probability) {
            return None;
        }
        let repair_time = self.rng.uniform(m.duration.min, m.duration.max);
        let due = now.offset_hours(repair_time);
        self.repair_due = Some(due);
        self.position = self.config.locations.depot;
        self.stats.malfunctions += 1;
        info!(truck = %self.id, repair_time, %due, "malfunction, towed to depot");
        Some(repair_time)
    }

    // ── Bidding ───────────────────────────────────────────────────────────

    /// Would taking `level` on push the load to the depot threshold?
    #[inline]
    fn needs_depot_leg(&self, level: f64) -> bool {
        self.waste + level >= self.config.waste_threshold_level()
    }

    /// Travel cost of a mission to `bin` collecting `level`, including the
    /// anticipated depot leg.
    pub fn planned_distance(&self, bin: Cell, level: f64, view: &WorldView) -> f64 {
        let mut distance = view.travel_cost(self.position, bin);
        if self.needs_depot_leg(level) {
            distance += view.travel_cost(bin, view.depot());
        }
        distance
    }

    /// Bid cost, or `None` when the tank cannot cover the trip.
    ///
    /// The cost penalises loaded trucks: `distance × (1 + waste / capacity)`.
    pub fn mission_cost(&self, bin: Cell, level: f64, view: &WorldView) -> Option<f64> {
        let distance = self.planned_distance(bin, level, view);
        if distance * self.config.agents.truck.fuel.consumption > self.fuel {
            return None;
        }
        Some(distance * (1.0 + self.waste / self.config.agents.truck.waste.capacity))
    }

    /// Answer a call for proposals.  Expects `check_repair` to have run
    /// first in the same cycle.
    pub fn evaluate_cfp(&self, cfp: &CallForProposals, view: &WorldView) -> Payload {
        if self.is_malfunctioned() {
            return Payload::Refuse(RefuseReason::Malfunctioned);
        }
        if self.busy {
            return Payload::Refuse(RefuseReason::Busy);
        }
        if self.waste + cfp.level > self.config.agents.truck.waste.capacity {
            return Payload::Refuse(RefuseReason::Full);
        }
        match self.mission_cost(cfp.position, cfp.level, view) {
            Some(cost) => Payload::Propose { cost },
            None => Payload::Refuse(RefuseReason::NoFuel),
        }
    }

    /// A rejection from `bin` forgets it unless a mission for it is running.
    pub fn on_rejection(&mut self, bin: BinId) {
        if self.current_bin == Some(bin) && !self.busy {
            self.current_bin = None;
        }
    }

    // ── Service bookkeeping ───────────────────────────────────────────────

    /// Mark the truck busy with `bin`.  Returns `false` if a mission is
    /// already running.
    pub fn begin_service(&mut self, bin: BinId, now: SimTime) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        self.current_bin = Some(bin);
        self.service_start = Some(now);
        debug!(truck = %self.id, %bin, %now, "service started");
        true
    }

    /// Release the truck and add the elapsed simulated hours to the
    /// utilisation counter.
    pub fn end_service(&mut self, now: SimTime) {
        if let Some(start) = self.service_start.take() {
            let hours = now.hours_since(start);
            self.stats.busy_hours += hours;
            debug!(truck = %self.id, hours, total = self.stats.busy_hours, "service ended");
        }
        self.busy = false;
        self.current_bin = None;
    }

    // ── Movement and handling ─────────────────────────────────────────────

    /// Fuel a leg of travel cost `cost` will burn.
    #[inline]
    pub fn fuel_for(&self, cost: f64) -> f64 {
        cost * self.config.agents.truck.fuel.consumption
    }

    pub fn ensure_fuel(&self, cost: f64) -> Result<(), MissionError> {
        let needed = self.fuel_for(cost);
        if needed > self.fuel {
            Err(MissionError::InsufficientFuel { needed, available: self.fuel })
        } else {
            Ok(())
        }
    }

    /// Complete a leg to `to`: debit its fuel and move.
    pub fn arrive(&mut self, to: Cell, cost: f64) -> Result<(), MissionError> {
        self.ensure_fuel(cost)?;
        let burned = self.fuel_for(cost);
        self.fuel -= burned;
        self.stats.fuel_used += burned;
        self.stats.distance += self.position.manhattan(to) as u64;
        self.position = to;
        debug!(truck = %self.id, at = %to, fuel = self.fuel, "arrived");
        Ok(())
    }

    /// Start-of-mission refuel rule: the planned trip would outrun the tank
    /// or the tank is already at or under its threshold.
    pub fn needs_refuel(&self, planned_distance: f64) -> bool {
        self.fuel_for(planned_distance) > self.fuel || self.fuel <= self.config.fuel_threshold_level()
    }

    pub fn refill(&mut self) {
        let capacity = self.config.agents.truck.fuel.capacity;
        let added = capacity - self.fuel;
        self.fuel = capacity;
        self.stats.refuels += 1;
        self.stats.fuel_refilled += added;
        info!(truck = %self.id, added, "refuelled");
    }

    /// A truck never takes on more waste than it can carry, whatever it
    /// promised when it proposed.
    pub fn ensure_room(&self, amount: f64) -> Result<(), MissionError> {
        let capacity = self.config.agents.truck.waste.capacity;
        if self.waste + amount > capacity {
            Err(MissionError::OverCapacity { load: self.waste, level: amount, capacity })
        } else {
            Ok(())
        }
    }

    pub fn load(&mut self, amount: f64) {
        self.waste += amount;
        self.stats.collections += 1;
        self.stats.waste_collected += amount;
    }

    #[inline]
    pub fn needs_depot_return(&self) -> bool {
        self.waste >= self.config.waste_threshold_level()
    }

    pub fn unload(&mut self) {
        info!(truck = %self.id, unloaded = self.waste, "emptied at depot");
        self.waste = 0.0;
        self.stats.depot_returns += 1;
    }
}

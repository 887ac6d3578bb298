//! Collection missions.
//!
//! A mission runs inside the truck's acceptance behaviour, one at a time:
//!
//! 1. [`Mission::begin`] refuses a job the truck has no room for, then
//!    marks the truck busy through a [`ServiceGuard`].
//! 2. [`Mission::execute`] rolls for a malfunction, refuels if the plan
//!    demands it, travels to the bin and collects.  Its [`MissionOutcome`]
//!    maps to exactly one `inform` for the bin.
//! 3. [`Mission::finish`] runs after a completed collection and takes the
//!    truck to the depot when its load crossed the threshold.
//!
//! Dropping the mission (on any path) drops the guard, which ends the
//! service period and returns the truck to `Available`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};

use wcs_core::{BinId, Cell, SimConfig};
use wcs_fabric::{Acceptance, InformStatus};
use wcs_world::WorldReader;

use crate::{AgentEnv, MissionError, TruckState};

// ── Outcome ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum MissionOutcome {
    Completed { collected: f64 },
    /// Repair time in simulated hours.
    Malfunctioned { repair_time: f64 },
    Failed(MissionError),
}

impl MissionOutcome {
    /// The status reported to the bin.
    pub fn status(&self) -> InformStatus {
        match self {
            MissionOutcome::Completed { .. } => InformStatus::CollectionComplete,
            MissionOutcome::Malfunctioned { repair_time } => {
                InformStatus::TruckMalfunction { repair_time: *repair_time }
            }
            MissionOutcome::Failed(_) => InformStatus::CollectionFailed,
        }
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, MissionOutcome::Completed { .. })
    }
}

// ── ServiceGuard ──────────────────────────────────────────────────────────────

/// Holds a truck busy for as long as it lives.
///
/// Creation records the service start; drop records the end, adds the
/// elapsed simulated hours to the truck's utilisation and clears `busy` and
/// `current_bin`.  This runs on every exit path, including task abort.
pub struct ServiceGuard {
    state: Arc<Mutex<TruckState>>,
    world: WorldReader,
}

impl ServiceGuard {
    /// `None` if the truck is already busy.
    pub fn begin(state: &Arc<Mutex<TruckState>>, world: &WorldReader, bin: BinId) -> Option<Self> {
        let started = state.lock().begin_service(bin, world.now());
        started.then(|| Self { state: Arc::clone(state), world: world.clone() })
    }
}

impl Drop for ServiceGuard {
    fn drop(&mut self) {
        self.state.lock().end_service(self.world.now());
    }
}

// ── Mission ───────────────────────────────────────────────────────────────────

pub struct Mission {
    state:  Arc<Mutex<TruckState>>,
    world:  WorldReader,
    config: Arc<SimConfig>,
    bin:    BinId,
    target: Cell,
    level:  f64,
    _guard: ServiceGuard,
}

impl Mission {
    /// Take on the job described by `acceptance` from `bin`.
    pub fn begin(
        env:        &AgentEnv,
        state:      &Arc<Mutex<TruckState>>,
        bin:        BinId,
        acceptance: &Acceptance,
    ) -> Result<Self, MissionError> {
        if !acceptance.position.within(env.config.grid.size) {
            return Err(MissionError::OutsideGrid(acceptance.position));
        }
        state.lock().ensure_room(acceptance.level)?;
        let guard = ServiceGuard::begin(state, &env.world, bin).ok_or(MissionError::Busy)?;
        Ok(Self {
            state:  Arc::clone(state),
            world:  env.world.clone(),
            config: Arc::clone(&env.config),
            bin,
            target: acceptance.position,
            level:  acceptance.level,
            _guard: guard,
        })
    }

    #[inline]
    pub fn bin(&self) -> BinId {
        self.bin
    }

    /// Drive the mission up to and including the collection.
    pub async fn execute(&mut self) -> MissionOutcome {
        let now = self.world.now();
        let breakdown = {
            let mut truck = self.state.lock();
            truck.repair_remaining(now).or_else(|| truck.roll_malfunction(now))
        };
        if let Some(repair_time) = breakdown {
            return MissionOutcome::Malfunctioned { repair_time };
        }

        if let Err(e) = self.refuel_if_needed().await {
            return MissionOutcome::Failed(e);
        }
        if let Err(e) = self.travel(self.target).await {
            return MissionOutcome::Failed(e);
        }

        tokio::time::sleep(self.config.protocol.collection_delay()).await;
        let mut truck = self.state.lock();
        if let Err(e) = truck.ensure_room(self.level) {
            return MissionOutcome::Failed(e);
        }
        truck.load(self.level);
        MissionOutcome::Completed { collected: self.level }
    }

    /// Post-collection leg: unload at the depot if the load crossed the
    /// threshold.  Failures here are logged; the bin has already been told
    /// the collection succeeded.
    pub async fn finish(self) {
        let needs_return = self.state.lock().needs_depot_return();
        if !needs_return {
            return;
        }
        let depot = self.config.locations.depot;
        if let Err(e) = self.travel(depot).await {
            warn!(bin = %self.bin, error = %e, "depot return aborted");
            return;
        }
        tokio::time::sleep(self.config.protocol.unload_delay()).await;
        self.state.lock().unload();
    }

    // ── Legs ──────────────────────────────────────────────────────────────

    async fn refuel_if_needed(&self) -> Result<(), MissionError> {
        let view = self.world.view();
        let (needed, position) = {
            let truck = self.state.lock();
            let planned = truck.planned_distance(self.target, self.level, &view);
            (truck.needs_refuel(planned), truck.position())
        };
        if !needed {
            return Ok(());
        }
        let (station, _) = view.nearest_fuel_station(position).ok_or(MissionError::NoFuelStation)?;
        info!(bin = %self.bin, %station, "refuelling before collection");
        self.travel(station).await?;
        tokio::time::sleep(self.config.protocol.refuel_delay()).await;
        self.state.lock().refill();
        Ok(())
    }

    /// One leg: price it against the current traffic, check the tank, spend
    /// the travel time, then debit fuel and move.
    async fn travel(&self, to: Cell) -> Result<(), MissionError> {
        let from = self.state.lock().position();
        let cost = self.world.travel_cost(from, to);
        self.state.lock().ensure_fuel(cost)?;
        tokio::time::sleep(self.travel_time(cost)).await;
        self.state.lock().arrive(to, cost)
    }

    /// `cost / speed` simulated hours, scaled to wall-clock time.
    fn travel_time(&self, cost: f64) -> Duration {
        let hours = cost / self.config.agents.truck.speed;
        let secs = hours * self.config.time.real_seconds_per_hour;
        if secs.is_finite() && secs > 0.0 { Duration::from_secs_f64(secs) } else { Duration::ZERO }
    }
}

//! The `Sim` struct and its hourly loop.

use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use wcs_agents::{AgentEnv, BinAgent, BinSnapshot, BinState, TruckAgent, TruckSnapshot, TruckState};
use wcs_core::{BinId, Cell, SimConfig, SimRng, TruckId};
use wcs_fabric::PostOffice;
use wcs_world::{World, WorldPublisher, world_channel};

use crate::{FrameSnapshot, SimObserver, SimSummary};

/// What a finished (or interrupted) run leaves behind.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub summary:         SimSummary,
    pub hours_completed: u64,
    pub interrupted:     bool,
    pub bins:            Vec<BinSnapshot>,
    pub trucks:          Vec<TruckSnapshot>,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// A laid-out city ready to run.
///
/// Agents are spawned when the run starts, on the caller's tokio runtime,
/// and stopped when it ends.  Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    config:        Arc<SimConfig>,
    world:         World,
    bin_positions: Vec<Cell>,
    live_rng:      SimRng,
}

/// Running agents and the channel feeding them the world.
struct Fleet {
    publisher: WorldPublisher,
    office:    PostOffice,
    bins:      Vec<BinAgent>,
    trucks:    Vec<TruckAgent>,
}

impl Sim {
    pub(crate) fn new(config: Arc<SimConfig>, world: World, bin_positions: Vec<Cell>, live_rng: SimRng) -> Self {
        Self { config, world, bin_positions, live_rng }
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn bin_positions(&self) -> &[Cell] {
        &self.bin_positions
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run every configured hour.
    pub async fn run<O: SimObserver>(self, observer: &mut O) -> RunReport {
        self.run_until(observer, std::future::pending::<()>()).await
    }

    /// Run until the last hour or until `shutdown` resolves, whichever is
    /// first.  Statistics are aggregated and agents released either way.
    pub async fn run_until<O, F>(mut self, observer: &mut O, shutdown: F) -> RunReport
    where
        O: SimObserver,
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let hour = self.config.hour_duration();
        let total_hours = self.config.total_hours();
        info!(
            depot = %self.config.locations.depot,
            days = self.config.simulation.days,
            seconds_per_hour = self.config.time.real_seconds_per_hour,
            "simulation started"
        );

        let fleet = self.spawn_fleet();
        tokio::pin!(shutdown);

        let mut hours_completed = 0;
        let mut interrupted = false;
        while hours_completed < total_hours {
            let tick_started = Instant::now();
            observer.on_tick_start(self.world.now());

            let step = self.world.step_hour();
            fleet.publisher.publish(self.world.view().clone());
            debug!(time = %step.time, expired = step.expired, spawned = step.new_events.len(), "hour advanced");
            hours_completed += 1;

            observer.on_tick_end(&self.frame(&fleet));

            tokio::select! {
                _ = tokio::time::sleep_until(tick_started + hour) => {}
                _ = &mut shutdown => {
                    warn!(hours_completed, "simulation interrupted");
                    interrupted = true;
                    break;
                }
            }
        }

        let (bins, trucks) = Self::stop_fleet(fleet).await;
        let summary = SimSummary::aggregate(
            &self.config,
            &bins,
            &trucks,
            self.world.total_events(),
            started.elapsed(),
        );
        info!(
            collections = summary.total_collections,
            overflows = summary.total_overflow_incidents,
            malfunctions = summary.total_malfunctions,
            hours_completed,
            "simulation ended"
        );
        observer.on_sim_end(&summary);

        RunReport { summary, hours_completed, interrupted, bins, trucks }
    }

    // ── Agents ────────────────────────────────────────────────────────────

    fn spawn_fleet(&mut self) -> Fleet {
        let (publisher, reader) = world_channel(self.world.view().clone());
        let office = PostOffice::new();
        let env = AgentEnv { config: Arc::clone(&self.config), world: reader, office: office.clone() };

        let truck_ids: Vec<TruckId> = (0..self.config.agents.counts.trucks).map(TruckId).collect();
        let trucks: Vec<TruckAgent> = truck_ids
            .iter()
            .map(|&id| {
                let rng = self.live_rng.agent(id.0 as u64);
                TruckAgent::spawn(TruckState::new(id, Arc::clone(&self.config), rng), &env)
            })
            .collect();

        let stream_base = truck_ids.len() as u64;
        let bins: Vec<BinAgent> = self
            .bin_positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let id = BinId(i as u32);
                let rng = self.live_rng.agent(stream_base + i as u64);
                let state = BinState::new(id, position, &self.config.agents.bin, truck_ids.clone(), rng);
                BinAgent::spawn(state, &env)
            })
            .collect();

        info!(bins = bins.len(), trucks = trucks.len(), "agents started");
        Fleet { publisher, office, bins, trucks }
    }

    /// Stop every agent, then read final state.  Stopping waits for the
    /// aborted tasks, so interrupted missions have closed their service
    /// periods before the snapshot.
    async fn stop_fleet(mut fleet: Fleet) -> (Vec<BinSnapshot>, Vec<TruckSnapshot>) {
        for bin in &mut fleet.bins {
            bin.stop().await;
        }
        for truck in &mut fleet.trucks {
            truck.stop().await;
        }
        debug!(remaining = fleet.office.agent_count(), "agents released");

        let bins = fleet.bins.iter().map(BinAgent::snapshot).collect();
        let trucks = fleet.trucks.iter().map(TruckAgent::snapshot).collect();
        (bins, trucks)
    }

    fn frame(&self, fleet: &Fleet) -> FrameSnapshot {
        FrameSnapshot {
            time:          self.world.now(),
            depot:         self.config.locations.depot,
            fuel_stations: self.config.locations.fuel_stations.clone(),
            bins:          fleet.bins.iter().map(BinAgent::snapshot).collect(),
            trucks:        fleet.trucks.iter().map(TruckAgent::snapshot).collect(),
            active_events: self.world.active_events().len(),
            rush_hour:     self.world.is_rush_hour(),
        }
    }
}

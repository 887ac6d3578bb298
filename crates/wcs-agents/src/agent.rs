//! Spawning agents and reading their state from outside.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use wcs_core::{BinId, Cell, SimConfig, TruckId};
use wcs_fabric::{Address, AgentBuilder, AgentHandle, Performative, PostOffice};
use wcs_world::WorldReader;

use crate::behaviours::{HandleAcceptance, HandleCfp, HandleRejection, HandleResponses, MonitorLevel};
use crate::{BinState, BinStats, TruckState, TruckStats};

/// Everything an agent's behaviours share with the rest of the run.
#[derive(Clone)]
pub struct AgentEnv {
    pub config: Arc<SimConfig>,
    pub world:  WorldReader,
    pub office: PostOffice,
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BinSnapshot {
    pub id:       BinId,
    pub position: Cell,
    pub level:    f64,
    pub capacity: f64,
    pub stats:    BinStats,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TruckSnapshot {
    pub id:            TruckId,
    pub position:      Cell,
    pub fuel:          f64,
    pub waste:         f64,
    pub busy:          bool,
    pub malfunctioned: bool,
    pub stats:         TruckStats,
}

// ── BinAgent ──────────────────────────────────────────────────────────────────

pub struct BinAgent {
    state:  Arc<Mutex<BinState>>,
    handle: AgentHandle,
}

impl BinAgent {
    pub fn spawn(state: BinState, env: &AgentEnv) -> Self {
        let address = Address::Bin(state.id());
        let state = Arc::new(Mutex::new(state));
        let builder = AgentBuilder::new(address, &env.office);
        let postman = builder.postman();

        let handle = builder
            .periodic(
                env.config.agents.bin.monitor_period(),
                MonitorLevel { env: env.clone(), state: Arc::clone(&state), postman: postman.clone() },
            )
            .cyclic(
                Performative::Propose | Performative::Refuse | Performative::Inform,
                HandleResponses { env: env.clone(), state: Arc::clone(&state), postman },
            )
            .start();
        Self { state, handle }
    }

    #[inline]
    pub fn state(&self) -> &Arc<Mutex<BinState>> {
        &self.state
    }

    pub fn snapshot(&self) -> BinSnapshot {
        let bin = self.state.lock();
        BinSnapshot {
            id:       bin.id(),
            position: bin.position(),
            level:    bin.level(),
            capacity: bin.capacity(),
            stats:    *bin.stats(),
        }
    }

    pub async fn stop(&mut self) {
        self.handle.stop().await;
    }
}

// ── TruckAgent ────────────────────────────────────────────────────────────────

pub struct TruckAgent {
    state:  Arc<Mutex<TruckState>>,
    handle: AgentHandle,
}

impl TruckAgent {
    pub fn spawn(state: TruckState, env: &AgentEnv) -> Self {
        let address = Address::Truck(state.id());
        let state = Arc::new(Mutex::new(state));
        let builder = AgentBuilder::new(address, &env.office);
        let postman = builder.postman();

        let handle = builder
            .cyclic(
                Performative::Cfp,
                HandleCfp { env: env.clone(), state: Arc::clone(&state), postman: postman.clone() },
            )
            .cyclic(
                Performative::AcceptProposal,
                HandleAcceptance { env: env.clone(), state: Arc::clone(&state), postman },
            )
            .cyclic(
                Performative::RejectProposal,
                HandleRejection { env: env.clone(), state: Arc::clone(&state) },
            )
            .start();
        Self { state, handle }
    }

    #[inline]
    pub fn state(&self) -> &Arc<Mutex<TruckState>> {
        &self.state
    }

    pub fn snapshot(&self) -> TruckSnapshot {
        let truck = self.state.lock();
        TruckSnapshot {
            id:            truck.id(),
            position:      truck.position(),
            fuel:          truck.fuel(),
            waste:         truck.waste(),
            busy:          truck.is_busy(),
            malfunctioned: truck.is_malfunctioned(),
            stats:         *truck.stats(),
        }
    }

    /// Abort the behaviours.  A mission cut short has released the truck
    /// through its service guard by the time this returns.
    pub async fn stop(&mut self) {
        self.handle.stop().await;
    }
}

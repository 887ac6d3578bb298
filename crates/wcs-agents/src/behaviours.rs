//! Async behaviours that bind `BinState` / `TruckState` to the fabric.
//!
//! | Agent | Behaviour            | Kind     | Template                           |
//! |-------|----------------------|----------|------------------------------------|
//! | bin   | [`MonitorLevel`]     | periodic | -                                  |
//! | bin   | [`HandleResponses`]  | cyclic   | `propose \| refuse \| inform`      |
//! | truck | [`HandleCfp`]        | cyclic   | `cfp`                              |
//! | truck | [`HandleAcceptance`] | cyclic   | `accept-proposal`                  |
//! | truck | [`HandleRejection`]  | cyclic   | `reject-proposal`                  |

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use wcs_fabric::{
    Address, CyclicBehaviour, Envelope, InformStatus, Inbox, Payload, PeriodicBehaviour, Postman,
};

use crate::{AgentEnv, BinState, Mission, MissionError, MissionOutcome, Outgoing, TruckState};

fn deliver(postman: &Postman, outgoing: Vec<Outgoing>) {
    for msg in outgoing {
        postman.post(msg.to, msg.payload);
    }
}

/// Drop envelopes whose numbers no honest sender produces.
fn well_formed(owner: Address, env: &Envelope) -> bool {
    match env.payload.validate() {
        Ok(()) => true,
        Err(e) => {
            warn!(agent = %owner, from = %env.from, error = %e, "malformed message dropped");
            false
        }
    }
}

// ── Bin ───────────────────────────────────────────────────────────────────────

/// Fill update and CFP trigger; doubles as the CFP deadline check.
///
/// A pending retry leaves the next CFP to [`HandleResponses`].
pub struct MonitorLevel {
    pub(crate) env:     AgentEnv,
    pub(crate) state:   Arc<Mutex<BinState>>,
    pub(crate) postman: Postman,
}

#[async_trait]
impl PeriodicBehaviour for MonitorLevel {
    async fn on_tick(&mut self) {
        let now = self.env.world.now();
        let config = &self.env.config;
        let outgoing = {
            let mut bin = self.state.lock();
            if bin.is_awaiting() {
                bin.check_deadline(Instant::now(), now).unwrap_or_default()
            } else {
                let rate = config.agents.bin.fill_rate;
                let amount = bin.draw_fill(rate.min, rate.max, now);
                bin.fill(amount);
                if bin.needs_collection() && !bin.is_retry_pending() {
                    let deadline = Instant::now() + config.protocol.proposal_timeout();
                    bin.open_round(now, deadline, false)
                } else {
                    Vec::new()
                }
            }
        };
        deliver(&self.postman, outgoing);
    }
}

/// Collects bids and mission outcomes.
pub struct HandleResponses {
    pub(crate) env:     AgentEnv,
    pub(crate) state:   Arc<Mutex<BinState>>,
    pub(crate) postman: Postman,
}

impl HandleResponses {
    /// Re-auction after the assigned truck broke down.
    async fn retry_after_malfunction(&self) {
        tokio::time::sleep(self.env.config.protocol.retry_delay()).await;
        let now = self.env.world.now();
        let deadline = Instant::now() + self.env.config.protocol.proposal_timeout();
        let outgoing = self.state.lock().open_retry_round(now, deadline);
        deliver(&self.postman, outgoing);
    }
}

#[async_trait]
impl CyclicBehaviour for HandleResponses {
    async fn run_once(&mut self, inbox: &mut Inbox) {
        let Some(env) = inbox.receive(self.env.config.protocol.receive_timeout()).await else {
            return;
        };
        let Address::Truck(truck) = env.from else {
            debug!(bin = %inbox.owner(), from = %env.from, "message from non-truck ignored");
            return;
        };
        if !well_formed(inbox.owner(), &env) {
            return;
        }

        let now = self.env.world.now();
        let (outgoing, retry) = {
            let mut bin = self.state.lock();
            match &env.payload {
                Payload::Propose { cost } => (bin.on_propose(truck, *cost, now), false),
                Payload::Refuse(reason)   => (bin.on_refuse(truck, *reason, now), false),
                Payload::Inform(status)   => (Vec::new(), bin.on_inform(truck, status, now)),
                _ => (Vec::new(), false),
            }
        };
        deliver(&self.postman, outgoing);
        if retry {
            self.retry_after_malfunction().await;
        }
    }
}

// ── Truck ─────────────────────────────────────────────────────────────────────

/// Answers calls for proposals.  Repair is checked at the top of every
/// cycle.
pub struct HandleCfp {
    pub(crate) env:     AgentEnv,
    pub(crate) state:   Arc<Mutex<TruckState>>,
    pub(crate) postman: Postman,
}

#[async_trait]
impl CyclicBehaviour for HandleCfp {
    async fn run_once(&mut self, inbox: &mut Inbox) {
        self.state.lock().check_repair(self.env.world.now());

        let Some(env) = inbox.receive(self.env.config.protocol.receive_timeout()).await else {
            return;
        };
        if !well_formed(inbox.owner(), &env) {
            return;
        }
        let (Address::Bin(bin), Payload::Cfp(cfp)) = (env.from, &env.payload) else {
            return;
        };

        let view = self.env.world.view();
        let reply = self.state.lock().evaluate_cfp(cfp, &view);
        match &reply {
            Payload::Propose { cost } => debug!(truck = %inbox.owner(), %bin, cost, "proposing"),
            Payload::Refuse(reason)   => debug!(truck = %inbox.owner(), %bin, %reason, "refusing"),
            _ => {}
        }
        self.postman.post(bin, reply);
    }
}

/// Runs awarded missions, one at a time.
pub struct HandleAcceptance {
    pub(crate) env:     AgentEnv,
    pub(crate) state:   Arc<Mutex<TruckState>>,
    pub(crate) postman: Postman,
}

#[async_trait]
impl CyclicBehaviour for HandleAcceptance {
    async fn run_once(&mut self, inbox: &mut Inbox) {
        let Some(env) = inbox.receive(self.env.config.protocol.receive_timeout()).await else {
            return;
        };
        let truck = inbox.owner();
        let Address::Bin(bin) = env.from else {
            return;
        };
        let Payload::AcceptProposal(acceptance) = &env.payload else {
            return;
        };
        info!(%truck, %bin, at = %acceptance.position, level = acceptance.level, "proposal accepted");

        let started = env
            .payload
            .validate()
            .map_err(MissionError::from)
            .and_then(|()| Mission::begin(&self.env, &self.state, bin, acceptance));
        let mut mission = match started {
            Ok(mission) => mission,
            Err(e) => {
                warn!(%truck, %bin, error = %e, "mission rejected");
                self.postman.post(bin, Payload::Inform(InformStatus::CollectionFailed));
                return;
            }
        };

        let outcome = mission.execute().await;
        match &outcome {
            MissionOutcome::Completed { collected } => {
                info!(%truck, %bin, collected, "collection complete")
            }
            MissionOutcome::Malfunctioned { repair_time } => {
                info!(%truck, %bin, repair_time, "mission aborted by malfunction")
            }
            MissionOutcome::Failed(e) => warn!(%truck, %bin, error = %e, "mission failed"),
        }
        if outcome.is_completed() {
            self.postman.post(bin, Payload::Inform(outcome.status()));
            mission.finish().await;
        } else {
            // Release the truck before the bin can re-auction.
            drop(mission);
            self.postman.post(bin, Payload::Inform(outcome.status()));
        }
    }
}

/// Forgets bins that awarded their job elsewhere.
pub struct HandleRejection {
    pub(crate) env:   AgentEnv,
    pub(crate) state: Arc<Mutex<TruckState>>,
}

#[async_trait]
impl CyclicBehaviour for HandleRejection {
    async fn run_once(&mut self, inbox: &mut Inbox) {
        let Some(env) = inbox.receive(self.env.config.protocol.receive_timeout()).await else {
            return;
        };
        if let (Address::Bin(bin), Payload::RejectProposal(rejection)) = (env.from, &env.payload) {
            debug!(
                truck = %inbox.owner(),
                %bin,
                reason = rejection.reason.as_str(),
                selected = rejection.selected_cost,
                ours = rejection.your_cost,
                "proposal rejected"
            );
            self.state.lock().on_rejection(bin);
        }
    }
}

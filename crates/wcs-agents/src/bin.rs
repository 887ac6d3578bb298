//! Smart-bin state machine: fill model plus Contract-Net auctioneer.
//!
//! # Phases
//!
//! | Phase               | Entered when                          | Left when                              |
//! |---------------------|---------------------------------------|----------------------------------------|
//! | `Idle`              | start, collection, abandoned round    | level crosses threshold → CFP          |
//! | `AwaitingProposals` | CFP broadcast                         | all trucks answered, or deadline       |
//! | `AwaitingOutcome`   | winner accepted                       | `inform` from the winner               |
//! | `RetryPending`      | winner reported a malfunction         | retry delay elapsed → retry CFP        |
//!
//! Selection is transient: it happens inside the transition that completes
//! the response set (or hits the deadline) and never persists as a phase.
//!
//! While a retry is pending the periodic monitor keeps filling the bin but
//! never opens a round of its own, so the next CFP is the flagged retry.
//!
//! Invariant: every truck with a recorded proposal is also in the responded
//! set.

use std::collections::{BTreeMap, BTreeSet};

use tokio::time::Instant;
use tracing::{debug, info};

use wcs_core::{AgentRng, BinId, Cell, SimTime, TruckId};
use wcs_core::config::BinConfig;
use wcs_fabric::{
    Acceptance, CallForProposals, InformStatus, Payload, RefuseReason, RejectReason, Rejection,
};

use crate::{BinStats, Outgoing};

/// Costs are compared in hundredths.  The nudge keeps decimal halves such
/// as `2.995` in the upper bucket despite their binary representation.
const COST_BUCKET_NUDGE: f64 = 1e-7;

#[inline]
fn cost_bucket(cost: f64) -> i64 {
    (cost * 100.0 + COST_BUCKET_NUDGE).round() as i64
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinPhase {
    Idle,
    AwaitingProposals,
    AwaitingOutcome,
    RetryPending,
}

// ── Negotiation round ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Round {
    open:      bool,
    deadline:  Option<Instant>,
    proposals: BTreeMap<TruckId, f64>,
    responded: BTreeSet<TruckId>,
    selected:  Option<TruckId>,
}

impl Round {
    fn reset(&mut self) {
        *self = Round::default();
    }
}

// ── BinState ──────────────────────────────────────────────────────────────────

pub struct BinState {
    id:              BinId,
    position:        Cell,
    capacity:        f64,
    threshold:       f64,
    level:           f64,
    last_collection: Option<SimTime>,
    trucks:          Vec<TruckId>,
    round:           Round,
    retry_pending:   bool,
    rng:             AgentRng,
    stats:           BinStats,
}

impl BinState {
    pub fn new(id: BinId, position: Cell, config: &BinConfig, trucks: Vec<TruckId>, rng: AgentRng) -> Self {
        Self {
            id,
            position,
            capacity: config.capacity,
            threshold: config.threshold,
            level: 0.0,
            last_collection: None,
            trucks,
            round: Round::default(),
            retry_pending: false,
            rng,
            stats: BinStats::default(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> BinId { self.id }
    #[inline] pub fn position(&self) -> Cell { self.position }
    #[inline] pub fn level(&self) -> f64 { self.level }
    #[inline] pub fn capacity(&self) -> f64 { self.capacity }
    #[inline] pub fn last_collection(&self) -> Option<SimTime> { self.last_collection }
    #[inline] pub fn stats(&self) -> &BinStats { &self.stats }
    #[inline] pub fn selected(&self) -> Option<TruckId> { self.round.selected }

    pub fn phase(&self) -> BinPhase {
        match (self.round.open, self.round.selected) {
            (false, _) if self.retry_pending => BinPhase::RetryPending,
            (false, _)      => BinPhase::Idle,
            (true, None)    => BinPhase::AwaitingProposals,
            (true, Some(_)) => BinPhase::AwaitingOutcome,
        }
    }

    #[inline]
    pub fn is_awaiting(&self) -> bool {
        self.round.open
    }

    #[inline]
    pub fn is_retry_pending(&self) -> bool {
        self.retry_pending
    }

    #[inline]
    pub fn needs_collection(&self) -> bool {
        self.level >= self.capacity * self.threshold
    }

    pub fn proposals(&self) -> impl Iterator<Item = (TruckId, f64)> + '_ {
        self.round.proposals.iter().map(|(&t, &c)| (t, c))
    }

    pub fn has_responded(&self, truck: TruckId) -> bool {
        self.round.responded.contains(&truck)
    }

    /// Overwrite the fill level, clamped to `[0, capacity]`.
    pub fn set_level(&mut self, level: f64) {
        self.level = level.clamp(0.0, self.capacity);
    }

    // ── Fill model ────────────────────────────────────────────────────────

    /// Draw this period's fill increment: uniform over `[min, max]`, halved
    /// at night.
    pub fn draw_fill(&mut self, min: f64, max: f64, now: SimTime) -> f64 {
        let amount = self.rng.uniform(min, max);
        if now.is_night() { amount * 0.5 } else { amount }
    }

    /// Add `amount` of waste, capped at capacity.  Generation is recorded
    /// in full; an overflow is counted when the bin ends up at capacity.
    pub fn fill(&mut self, amount: f64) {
        self.level = (self.level + amount).min(self.capacity);
        self.stats.waste_generated += amount;
        if self.level >= self.capacity {
            self.stats.overflow_incidents += 1;
        }
        debug!(bin = %self.id, level = self.level, capacity = self.capacity, "fill");
    }

    // ── Auction ───────────────────────────────────────────────────────────

    /// Start a fresh round and broadcast a CFP to every known truck.
    pub fn open_round(&mut self, now: SimTime, deadline: Instant, retry: bool) -> Vec<Outgoing> {
        self.round.reset();
        self.retry_pending = false;
        self.round.open = true;
        self.round.deadline = Some(deadline);
        self.stats.auctions += 1;

        let cfp = CallForProposals {
            position:        self.position,
            level:           self.level,
            time:            now,
            last_collection: self.last_collection,
            retry,
        };
        info!(bin = %self.id, level = self.level, trucks = self.trucks.len(), retry, "CFP issued");
        self.trucks
            .iter()
            .map(|&truck| Outgoing::new(truck, Payload::Cfp(cfp.clone())))
            .collect()
    }

    /// Re-auction after a malfunction.  Empty unless a retry is pending.
    pub fn open_retry_round(&mut self, now: SimTime, deadline: Instant) -> Vec<Outgoing> {
        if !self.retry_pending {
            return Vec::new();
        }
        self.open_round(now, deadline, true)
    }

    /// Record a bid.  Ignored outside an open round, after selection, from
    /// unknown trucks, or from trucks that already answered.
    pub fn on_propose(&mut self, truck: TruckId, cost: f64, now: SimTime) -> Vec<Outgoing> {
        if !self.accepting_responses() || !self.trucks.contains(&truck) || self.has_responded(truck) {
            debug!(bin = %self.id, %truck, cost, "late or duplicate proposal ignored");
            return Vec::new();
        }
        debug!(bin = %self.id, %truck, cost, "proposal received");
        self.round.proposals.insert(truck, cost);
        self.round.responded.insert(truck);
        self.select_if_complete(now)
    }

    pub fn on_refuse(&mut self, truck: TruckId, reason: RefuseReason, now: SimTime) -> Vec<Outgoing> {
        if !self.accepting_responses() || !self.trucks.contains(&truck) {
            return Vec::new();
        }
        debug!(bin = %self.id, %truck, %reason, "refusal received");
        self.round.proposals.remove(&truck);
        self.round.responded.insert(truck);
        self.select_if_complete(now)
    }

    /// Deadline check performed by the periodic behaviour.
    ///
    /// Returns `None` while the deadline is pending.  Once it has passed,
    /// the round is either abandoned (no proposals, bin returns to `Idle`)
    /// or resolved with the proposals at hand.
    pub fn check_deadline(&mut self, instant: Instant, now: SimTime) -> Option<Vec<Outgoing>> {
        let deadline = self.round.deadline?;
        if instant < deadline {
            return None;
        }
        if self.round.proposals.is_empty() {
            info!(bin = %self.id, "no proposals before deadline, will retry");
            self.round.reset();
            return Some(Vec::new());
        }
        Some(self.select(now))
    }

    /// Handle an `inform` from the truck carrying out this bin's mission.
    ///
    /// Returns `true` when the bin should re-auction after the retry delay.
    pub fn on_inform(&mut self, truck: TruckId, status: &InformStatus, now: SimTime) -> bool {
        if self.round.selected != Some(truck) {
            debug!(bin = %self.id, %truck, status = status.as_str(), "inform from unselected truck ignored");
            return false;
        }
        match status {
            InformStatus::CollectionComplete => {
                info!(bin = %self.id, %truck, collected = self.level, "emptied");
                self.level = 0.0;
                self.last_collection = Some(now);
                self.stats.collections += 1;
                self.round.reset();
                false
            }
            InformStatus::TruckMalfunction { repair_time } => {
                info!(bin = %self.id, %truck, repair_time, "assigned truck malfunctioned");
                self.round.reset();
                self.retry_pending = true;
                true
            }
            InformStatus::CollectionFailed => {
                info!(bin = %self.id, %truck, "collection failed");
                self.round.reset();
                false
            }
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────

    #[inline]
    fn accepting_responses(&self) -> bool {
        self.round.open && self.round.selected.is_none()
    }

    fn select_if_complete(&mut self, now: SimTime) -> Vec<Outgoing> {
        if self.trucks.iter().all(|t| self.round.responded.contains(t)) {
            self.select(now)
        } else {
            Vec::new()
        }
    }

    /// Award the round to the cheapest bid, ties broken uniformly at random.
    ///
    /// Rejections go out before the acceptance.  With no proposals the
    /// round is abandoned.
    fn select(&mut self, now: SimTime) -> Vec<Outgoing> {
        let Some(best) = self.round.proposals.values().map(|&c| cost_bucket(c)).min() else {
            info!(bin = %self.id, "every truck refused, will retry");
            self.round.reset();
            return Vec::new();
        };
        let tied: Vec<TruckId> = self
            .round
            .proposals
            .iter()
            .filter(|&(_, &c)| cost_bucket(c) == best)
            .map(|(&t, _)| t)
            .collect();
        let Some(&winner) = self.rng.choose(&tied) else {
            self.round.reset();
            return Vec::new();
        };
        let selected_cost = best as f64 / 100.0;

        self.round.selected = Some(winner);
        self.round.deadline = None;
        self.stats.mission_costs += selected_cost;
        info!(bin = %self.id, truck = %winner, cost = selected_cost, bids = self.round.proposals.len(), "winner selected");

        let mut out: Vec<Outgoing> = self
            .round
            .proposals
            .iter()
            .filter(|&(&t, _)| t != winner)
            .map(|(&t, &your_cost)| {
                Outgoing::new(t, Payload::RejectProposal(Rejection {
                    reason: RejectReason::BetterProposalSelected,
                    selected_cost,
                    your_cost,
                }))
            })
            .collect();
        out.push(Outgoing::new(winner, Payload::AcceptProposal(Acceptance {
            position: self.position,
            level:    self.level,
            time:     now,
        })));
        out
    }
}

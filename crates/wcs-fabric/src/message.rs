//! Message vocabulary of the Contract-Net negotiation.
//!
//! A [`Payload`] is a closed sum over the six performatives; each variant
//! carries exactly the body that performative needs, so a receiver matches
//! on the variant instead of parsing free-form content.
//!
//! | Performative      | Direction   | Body                    |
//! |-------------------|-------------|-------------------------|
//! | `cfp`             | bin → truck | [`CallForProposals`]    |
//! | `propose`         | truck → bin | cost                    |
//! | `refuse`          | truck → bin | [`RefuseReason`]        |
//! | `accept-proposal` | bin → truck | [`Acceptance`]          |
//! | `reject-proposal` | bin → truck | [`Rejection`]           |
//! | `inform`          | truck → bin | [`InformStatus`]        |

use std::fmt;

use serde::{Deserialize, Serialize};
use wcs_core::{BinId, Cell, SimTime, TruckId};

use crate::{FabricError, FabricResult};

// ── Address ───────────────────────────────────────────────────────────────────

/// Unique name of an agent on the fabric.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Address {
    Bin(BinId),
    Truck(TruckId),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Bin(id)   => write!(f, "{id}"),
            Address::Truck(id) => write!(f, "{id}"),
        }
    }
}

impl From<BinId> for Address {
    fn from(id: BinId) -> Self {
        Address::Bin(id)
    }
}

impl From<TruckId> for Address {
    fn from(id: TruckId) -> Self {
        Address::Truck(id)
    }
}

// ── Performative ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Performative {
    Cfp,
    Propose,
    Refuse,
    AcceptProposal,
    RejectProposal,
    Inform,
}

impl Performative {
    pub const ALL: [Performative; 6] = [
        Performative::Cfp,
        Performative::Propose,
        Performative::Refuse,
        Performative::AcceptProposal,
        Performative::RejectProposal,
        Performative::Inform,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Performative::Cfp            => "cfp",
            Performative::Propose        => "propose",
            Performative::Refuse         => "refuse",
            Performative::AcceptProposal => "accept-proposal",
            Performative::RejectProposal => "reject-proposal",
            Performative::Inform         => "inform",
        }
    }

    /// Bit used by [`Template`](crate::Template).
    #[inline]
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Bodies ────────────────────────────────────────────────────────────────────

/// Body of a call for proposals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallForProposals {
    pub position:        Cell,
    pub level:           f64,
    pub time:            SimTime,
    pub last_collection: Option<SimTime>,
    /// Set when the CFP re-opens an auction after a truck malfunctioned.
    pub retry:           bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefuseReason {
    Malfunctioned,
    Busy,
    Full,
    NoFuel,
}

impl RefuseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RefuseReason::Malfunctioned => "MALFUNCTIONED",
            RefuseReason::Busy          => "BUSY",
            RefuseReason::Full          => "FULL",
            RefuseReason::NoFuel        => "NO_FUEL",
        }
    }
}

impl fmt::Display for RefuseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an accept-proposal: where to go and how much is waiting there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Acceptance {
    pub position: Cell,
    pub level:    f64,
    pub time:     SimTime,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    BetterProposalSelected,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::BetterProposalSelected => "better_proposal_selected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason:        RejectReason,
    pub selected_cost: f64,
    pub your_cost:     f64,
}

/// Mission outcome reported back to the bin that awarded it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InformStatus {
    /// Repair time is in simulated hours.
    TruckMalfunction { repair_time: f64 },
    CollectionComplete,
    CollectionFailed,
}

impl InformStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InformStatus::TruckMalfunction { .. } => "TRUCK_MALFUNCTION",
            InformStatus::CollectionComplete     => "COLLECTION_COMPLETE",
            InformStatus::CollectionFailed       => "COLLECTION_FAILED",
        }
    }
}

// ── Payload ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Cfp(CallForProposals),
    Propose { cost: f64 },
    Refuse(RefuseReason),
    AcceptProposal(Acceptance),
    RejectProposal(Rejection),
    Inform(InformStatus),
}

impl Payload {
    pub fn performative(&self) -> Performative {
        match self {
            Payload::Cfp(_)            => Performative::Cfp,
            Payload::Propose { .. }    => Performative::Propose,
            Payload::Refuse(_)         => Performative::Refuse,
            Payload::AcceptProposal(_) => Performative::AcceptProposal,
            Payload::RejectProposal(_) => Performative::RejectProposal,
            Payload::Inform(_)         => Performative::Inform,
        }
    }

    /// Reject bodies carrying numbers no sender could legitimately produce.
    ///
    /// Levels, costs and repair times must be finite and non-negative.
    pub fn validate(&self) -> FabricResult<()> {
        let check = |name: &str, v: f64| -> FabricResult<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(FabricError::Malformed {
                    performative: self.performative(),
                    reason:       format!("{name} = {v}"),
                })
            }
        };
        match self {
            Payload::Cfp(cfp)               => check("level", cfp.level),
            Payload::Propose { cost }       => check("cost", *cost),
            Payload::AcceptProposal(acc)    => check("level", acc.level),
            Payload::RejectProposal(rej)    => {
                check("selected_cost", rej.selected_cost)?;
                check("your_cost", rej.your_cost)
            }
            Payload::Inform(InformStatus::TruckMalfunction { repair_time }) => {
                check("repair_time", *repair_time)
            }
            Payload::Refuse(_) | Payload::Inform(_) => Ok(()),
        }
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// A routed message.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub from:    Address,
    pub to:      Address,
    pub payload: Payload,
}

impl Envelope {
    #[inline]
    pub fn performative(&self) -> Performative {
        self.payload.performative()
    }
}

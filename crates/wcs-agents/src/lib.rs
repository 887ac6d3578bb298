//! `wcs-agents`: smart bins auctioning collections and trucks bidding.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`intent`]     | `Outgoing`: a message a state machine wants sent            |
//! | [`stats`]      | `BinStats`, `TruckStats`                                    |
//! | [`bin`]        | `BinState`: fill model and Contract-Net auctioneer         |
//! | [`truck`]      | `TruckState`: bidding, fuel, load and repair bookkeeping   |
//! | [`mission`]    | `Mission`, `MissionOutcome`, `ServiceGuard`                 |
//! | [`behaviours`] | async behaviours binding the state machines to the fabric  |
//! | [`agent`]      | `AgentEnv`, `BinAgent`, `TruckAgent` (spawn, snapshot, stop) |
//! | [`error`]      | `MissionError`                                              |
//!
//! # Design
//!
//! `BinState` and `TruckState` are synchronous and own no I/O: every
//! transition returns the [`Outgoing`] messages it wants delivered, so the
//! protocol can be unit-tested without a runtime.  The behaviours lock the
//! state, apply one transition, release the lock, then post the messages
//! and perform any sleeps.  No lock is ever held across an `.await`.

pub mod agent;
pub mod behaviours;
pub mod bin;
pub mod error;
pub mod intent;
pub mod mission;
pub mod stats;
pub mod truck;


pub use agent::{AgentEnv, BinAgent, BinSnapshot, TruckAgent, TruckSnapshot};
pub use bin::{BinPhase, BinState};
pub use error::MissionError;
pub use intent::Outgoing;
pub use mission::{Mission, MissionOutcome, ServiceGuard};
pub use stats::{BinStats, TruckStats};
pub use truck::TruckState;

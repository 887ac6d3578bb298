//! `wcs-fabric`: the message substrate agents negotiate over.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`message`]   | `Address`, `Performative`, `Payload` and its bodies, `Envelope` |
//! | [`template`]  | `Template`: performative filter, composable with `\|`       |
//! | [`post`]      | `PostOffice` (directory + routing), `Postman` (send handle)  |
//! | [`inbox`]     | `Inbox`: per-behaviour queue with timeout receive           |
//! | [`behaviour`] | `PeriodicBehaviour`, `CyclicBehaviour`                        |
//! | [`agent`]     | `AgentBuilder`, `AgentHandle`                                |
//! | [`error`]     | `FabricError`, `FabricResult<T>`                             |
//!
//! # Delivery model
//!
//! Every cyclic behaviour registers a [`Template`] with the post office and
//! gets its own [`Inbox`].  A message is routed to the first behaviour of
//! the recipient whose template matches its performative; behaviours never
//! see messages outside their template.  Each route is an unbounded
//! `tokio::sync::mpsc` channel, so delivery is FIFO per sender→receiver
//! pair and sending never blocks.
//!
//! The only suspension points are [`Inbox::receive`] (bounded by a timeout)
//! and explicit sleeps inside behaviours.  Agent state that two behaviours
//! share lives behind a `parking_lot::Mutex` that is never held across an
//! `.await`.

pub mod agent;
pub mod behaviour;
pub mod error;
pub mod inbox;
pub mod message;
pub mod post;
pub mod template;

#[cfg(test)]
mod tests;

pub use agent::{AgentBuilder, AgentHandle};
pub use behaviour::{CyclicBehaviour, PeriodicBehaviour};
pub use error::{FabricError, FabricResult};
pub use inbox::Inbox;
pub use message::{
    Acceptance, Address, CallForProposals, Envelope, InformStatus, Payload, Performative,
    RefuseReason, RejectReason, Rejection,
};
pub use post::{PostOffice, Postman};
pub use template::Template;

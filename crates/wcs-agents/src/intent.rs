use wcs_fabric::{Address, Payload};

/// A message a state transition asks its behaviour to send.
///
/// Transitions run under the agent's state lock and must not perform I/O,
/// so they return these instead; the behaviour posts them after releasing
/// the lock, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Outgoing {
    pub to:      Address,
    pub payload: Payload,
}

impl Outgoing {
    pub fn new(to: impl Into<Address>, payload: Payload) -> Self {
        Self { to: to.into(), payload }
    }
}

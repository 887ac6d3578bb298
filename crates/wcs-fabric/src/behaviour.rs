//! Behaviour traits run by the agent runtime.
//!
//! Implementations hold whatever shared agent state they need (typically an
//! `Arc<parking_lot::Mutex<_>>`) plus a [`Postman`](crate::Postman) for
//! replies.  The runtime owns scheduling; a behaviour only describes one
//! step of work.

use async_trait::async_trait;

use crate::Inbox;

/// Work repeated on a fixed wall-clock period.
#[async_trait]
pub trait PeriodicBehaviour: Send + 'static {
    async fn on_tick(&mut self);
}

/// Work repeated back-to-back for the agent's lifetime.
///
/// Each call usually begins with a bounded [`Inbox::receive`] and handles at
/// most one envelope.
#[async_trait]
pub trait CyclicBehaviour: Send + 'static {
    async fn run_once(&mut self, inbox: &mut Inbox);
}

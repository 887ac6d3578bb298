//! Broadcasting world snapshots to agents.
//!
//! A `tokio::sync::watch` channel holds the latest [`WorldView`].  The
//! orchestrator publishes after every tick; readers always observe the most
//! recent snapshot and never block the publisher.

use tokio::sync::watch;

use wcs_core::{Cell, SimTime};

use crate::WorldView;

/// Create a connected publisher/reader pair seeded with `initial`.
pub fn world_channel(initial: WorldView) -> (WorldPublisher, WorldReader) {
    let (tx, rx) = watch::channel(initial);
    (WorldPublisher { tx }, WorldReader { rx })
}

/// The orchestrator's end of the channel.
pub struct WorldPublisher {
    tx: watch::Sender<WorldView>,
}

impl WorldPublisher {
    /// Replace the current snapshot.  Succeeds even with no live readers.
    pub fn publish(&self, view: WorldView) {
        self.tx.send_replace(view);
    }

    /// Another reader attached to this publisher.
    pub fn reader(&self) -> WorldReader {
        WorldReader { rx: self.tx.subscribe() }
    }
}

/// An agent's handle on the latest world snapshot.
#[derive(Clone)]
pub struct WorldReader {
    rx: watch::Receiver<WorldView>,
}

impl WorldReader {
    /// Clone out the latest snapshot.
    pub fn view(&self) -> WorldView {
        self.rx.borrow().clone()
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.rx.borrow().time
    }

    /// Travel cost under current conditions.
    pub fn travel_cost(&self, from: Cell, to: Cell) -> f64 {
        self.rx.borrow().travel_cost(from, to)
    }
}

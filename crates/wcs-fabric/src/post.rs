//! Agent directory and message routing.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

use crate::{Address, Envelope, FabricError, FabricResult, Inbox, Payload, Template};

struct Route {
    template: Template,
    tx:       UnboundedSender<Envelope>,
}

/// Shared directory of every registered agent and its behaviour routes.
///
/// Cloning is cheap; all clones see the same directory.  The lock is only
/// held for the lookup and the non-blocking channel push.
#[derive(Clone, Default)]
pub struct PostOffice {
    routes: Arc<RwLock<FxHashMap<Address, Vec<Route>>>>,
}

impl PostOffice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new route for `owner` and return its receiving end.
    ///
    /// When several routes of one agent overlap, the earliest registered
    /// one receives the message.
    pub fn register(&self, owner: Address, template: Template) -> Inbox {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.write().entry(owner).or_default().push(Route { template, tx });
        Inbox::new(owner, template, rx)
    }

    /// Remove every route of `owner`.  Pending envelopes are dropped with
    /// the channels and later sends fail with `UnknownRecipient`.
    pub fn deregister(&self, owner: Address) {
        self.routes.write().remove(&owner);
    }

    pub fn is_registered(&self, owner: Address) -> bool {
        self.routes.read().contains_key(&owner)
    }

    pub fn agent_count(&self) -> usize {
        self.routes.read().len()
    }

    /// Route `payload` to the first behaviour of `to` whose template matches.
    pub fn send(&self, from: Address, to: Address, payload: Payload) -> FabricResult<()> {
        let performative = payload.performative();
        let routes = self.routes.read();
        let agent = routes.get(&to).ok_or(FabricError::UnknownRecipient(to))?;
        let route = agent
            .iter()
            .find(|r| r.template.matches(performative))
            .ok_or(FabricError::NoRoute { to, performative })?;
        route
            .tx
            .send(Envelope { from, to, payload })
            .map_err(|_| FabricError::Closed(to))?;
        debug!(%from, %to, %performative, "message sent");
        Ok(())
    }

    /// A sending handle bound to `owner`.
    pub fn postman(&self, owner: Address) -> Postman {
        Postman { owner, office: self.clone() }
    }
}

/// Sending half an agent's behaviours carry around.
#[derive(Clone)]
pub struct Postman {
    owner:  Address,
    office: PostOffice,
}

impl Postman {
    #[inline]
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn send(&self, to: Address, payload: Payload) -> FabricResult<()> {
        self.office.send(self.owner, to, payload)
    }

    /// Fire-and-forget send.  Delivery failures are logged and reported as
    /// `false`; the protocol tolerates lost messages through its timeouts.
    pub fn post(&self, to: impl Into<Address>, payload: Payload) -> bool {
        let to = to.into();
        match self.send(to, payload) {
            Ok(()) => true,
            Err(e) => {
                warn!(from = %self.owner, %to, error = %e, "message dropped");
                false
            }
        }
    }
}

//! Agent assembly and task lifecycle.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{
    Address, CyclicBehaviour, Inbox, PeriodicBehaviour, PostOffice, Postman, Template,
};

/// Fluent builder collecting an agent's behaviours before launch.
///
/// Routes are registered with the post office as each cyclic behaviour is
/// added, so messages sent before [`AgentBuilder::start`] are queued rather
/// than lost.
pub struct AgentBuilder {
    address:  Address,
    office:   PostOffice,
    periodic: Vec<(Duration, Box<dyn PeriodicBehaviour>)>,
    cyclic:   Vec<(Inbox, Box<dyn CyclicBehaviour>)>,
}

impl AgentBuilder {
    pub fn new(address: Address, office: &PostOffice) -> Self {
        Self {
            address,
            office: office.clone(),
            periodic: Vec::new(),
            cyclic: Vec::new(),
        }
    }

    pub fn postman(&self) -> Postman {
        self.office.postman(self.address)
    }

    pub fn periodic(mut self, period: Duration, behaviour: impl PeriodicBehaviour) -> Self {
        self.periodic.push((period, Box::new(behaviour)));
        self
    }

    pub fn cyclic(mut self, template: impl Into<Template>, behaviour: impl CyclicBehaviour) -> Self {
        let inbox = self.office.register(self.address, template.into());
        self.cyclic.push((inbox, Box::new(behaviour)));
        self
    }

    /// Spawn one task per behaviour on the current runtime.
    pub fn start(self) -> AgentHandle {
        let mut tasks = Vec::with_capacity(self.periodic.len() + self.cyclic.len());

        for (period, mut behaviour) in self.periodic {
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    behaviour.on_tick().await;
                }
            }));
        }

        for (mut inbox, mut behaviour) in self.cyclic {
            let address = self.address;
            tasks.push(tokio::spawn(async move {
                while !inbox.is_closed() {
                    behaviour.run_once(&mut inbox).await;
                    tokio::task::yield_now().await;
                }
                debug!(agent = %address, "route closed, behaviour finished");
            }));
        }

        info!(agent = %self.address, behaviours = tasks.len(), "agent started");
        AgentHandle { address: self.address, office: self.office, tasks }
    }
}

/// Running agent.  Dropping the handle leaves the tasks running; call
/// [`AgentHandle::stop`] to release them.
pub struct AgentHandle {
    address: Address,
    office:  PostOffice,
    tasks:   Vec<JoinHandle<()>>,
}

impl AgentHandle {
    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    /// Abort every behaviour, remove the agent from the directory and wait
    /// until the aborted tasks are gone.
    ///
    /// Once this returns, everything the behaviours owned has been dropped.
    pub async fn stop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        self.office.deregister(self.address);
        for task in self.tasks.drain(..) {
            match task.await {
                Err(e) if e.is_panic() => warn!(agent = %self.address, error = %e, "behaviour panicked"),
                _ => {}
            }
        }
        debug!(agent = %self.address, "agent stopped");
    }
}

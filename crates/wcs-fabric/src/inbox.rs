use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::{Address, Envelope, Template};

/// Receiving end of one behaviour's route.
///
/// Only envelopes matching the template the inbox was registered with are
/// ever delivered here.
pub struct Inbox {
    owner:    Address,
    template: Template,
    rx:       UnboundedReceiver<Envelope>,
    closed:   bool,
}

impl Inbox {
    pub(crate) fn new(owner: Address, template: Template, rx: UnboundedReceiver<Envelope>) -> Self {
        Self { owner, template, rx, closed: false }
    }

    #[inline]
    pub fn owner(&self) -> Address {
        self.owner
    }

    #[inline]
    pub fn template(&self) -> Template {
        self.template
    }

    /// `true` once the post office dropped this route.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Wait up to `timeout` for the next envelope.
    ///
    /// Returns `None` on timeout or once the route is closed.
    pub async fn receive(&mut self, timeout: Duration) -> Option<Envelope> {
        if self.closed {
            return None;
        }
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(envelope)) => Some(envelope),
            Ok(None) => {
                self.closed = true;
                None
            }
            Err(_elapsed) => None,
        }
    }

    /// Take an already-queued envelope without waiting.
    pub fn try_receive(&mut self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }
}

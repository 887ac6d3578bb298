use thiserror::Error;

use crate::{Address, Performative};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FabricError {
    #[error("no agent registered at {0}")]
    UnknownRecipient(Address),

    #[error("{to} has no behaviour accepting {performative}")]
    NoRoute {
        to:           Address,
        performative: Performative,
    },

    #[error("mailbox of {0} is closed")]
    Closed(Address),

    #[error("malformed {performative} body: {reason}")]
    Malformed {
        performative: Performative,
        reason:       String,
    },
}

pub type FabricResult<T> = Result<T, FabricError>;

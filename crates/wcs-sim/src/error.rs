use thiserror::Error;

use wcs_core::{Cell, CoreError};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("could only place {placed} of {requested} bins; grid too small for min_distance")]
    Placement {
        placed:    usize,
        requested: usize,
    },

    #[error("{what} length {got} does not match configured count {expected}")]
    CountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("bin position {0} is outside the grid or on a facility")]
    InvalidPosition(Cell),
}

pub type SimResult<T> = Result<T, SimError>;

use thiserror::Error;

use wcs_core::Cell;
use wcs_fabric::FabricError;

/// Why a mission ended without a collection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MissionError {
    #[error("insufficient fuel: need {needed:.2}, have {available:.2}")]
    InsufficientFuel { needed: f64, available: f64 },

    #[error("bin position {0} lies outside the grid")]
    OutsideGrid(Cell),

    #[error("load {load:.2} plus {level:.2} exceeds waste capacity {capacity:.2}")]
    OverCapacity { load: f64, level: f64, capacity: f64 },

    #[error("truck is already on a mission")]
    Busy,

    #[error("no fuel station configured")]
    NoFuelStation,

    #[error(transparent)]
    Malformed(#[from] FabricError),
}

//! `wcs-core`: foundational types for the waste-collection simulator.
//!
//! This crate is a dependency of every other `wcs-*` crate.  It has no
//! `wcs-*` dependencies and only a handful of external ones (`rand`,
//! `thiserror`, `serde`, `toml`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`ids`]     | `BinId`, `TruckId`                                       |
//! | [`grid`]    | `Cell`, Manhattan / Chebyshev distances                  |
//! | [`time`]    | `SimTime`, `HourWindow`, `DueTime`                       |
//! | [`rng`]     | `AgentRng` (per-agent), `SimRng` (world / bootstrap)     |
//! | [`config`]  | `SimConfig` and its sections, TOML loading, validation   |
//! | [`error`]   | `CoreError`, `CoreResult`                                |

pub mod config;
pub mod error;
pub mod grid;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{CoreError, CoreResult};
pub use grid::Cell;
pub use ids::{BinId, TruckId};
pub use rng::{AgentRng, SimRng};
pub use time::{DueTime, HourWindow, SimTime};

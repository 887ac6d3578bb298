//! `wcs-world`: the shared environment every agent reads.
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`clock`]    | `WorldClock`: hour/day counter advanced once per tick      |
//! | [`map`]      | `GridMap`: grid size, depot, fuel stations                 |
//! | [`traffic`]  | `TrafficEvent`, `TrafficEventKind`                          |
//! | [`world`]    | `World` (mutable owner), `WorldView` (immutable snapshot)   |
//! | [`shared`]   | `WorldPublisher` / `WorldReader` watch-channel pair         |
//!
//! # Ownership
//!
//! Only the orchestrator holds a `World` and calls
//! [`World::step_hour`].  After each step it publishes a cloned
//! [`WorldView`] through a [`WorldPublisher`]; agents hold a
//! [`WorldReader`] and never mutate the world.

pub mod clock;
pub mod map;
pub mod shared;
pub mod traffic;
pub mod world;

#[cfg(test)]
mod tests;

pub use clock::WorldClock;
pub use map::GridMap;
pub use shared::{WorldPublisher, WorldReader, world_channel};
pub use traffic::{TrafficEvent, TrafficEventKind};
pub use world::{StepReport, World, WorldView};

//! `wcs-sim`: orchestrates a waste-collection run.
//!
//! # Run loop
//!
//! ```text
//! bootstrap (seeded):  place bins, park trucks at the depot
//! spawn agents (live RNG), publish the initial world view
//! for hour in 0..days×24:
//!   ① observer.on_tick_start(now)
//!   ② world.step_hour()         : clock, traffic events
//!   ③ publish the new WorldView : agents see it on their next read
//!   ④ observer.on_tick_end(frame)
//!   ⑤ sleep off the rest of the hour's wall-clock budget
//!      (or stop early when the shutdown future resolves)
//! stop agents → aggregate SimSummary → observer.on_sim_end(summary)
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let config = SimConfig::load(path)?;
//! let sim = SimBuilder::new(config).build()?;
//! let report = sim.run_until(&mut observer, tokio::signal::ctrl_c()).await;
//! ```

pub mod builder;
pub mod error;
pub mod frame;
pub mod observer;
pub mod sim;
pub mod summary;


pub use builder::{SimBuilder, place_bins};
pub use error::{SimError, SimResult};
pub use frame::FrameSnapshot;
pub use observer::{NoopObserver, SimObserver};
pub use sim::{RunReport, Sim};
pub use summary::SimSummary;

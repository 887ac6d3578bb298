//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use tracing::info;

use wcs_core::{Cell, SimConfig, SimRng};
use wcs_world::{GridMap, World};

use crate::{Sim, SimError, SimResult};

/// Placement attempts allowed per bin before bootstrap gives up.
const ATTEMPTS_PER_BIN: usize = 1_000;

/// Fluent builder for [`Sim`].
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                       |
/// |----------------------|-----------------------------------------------|
/// | `.bin_positions(v)`  | random placement seeded by `simulation.seed`  |
/// | `.live_seed(s)`      | `simulation.live_seed` (entropy when `None`)  |
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimBuilder::new(config)
///     .live_seed(Some(42))
///     .build()?;
/// ```
pub struct SimBuilder {
    config:        SimConfig,
    bin_positions: Option<Vec<Cell>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, bin_positions: None }
    }

    /// Use fixed bin positions instead of seeded random placement.
    ///
    /// Must be length `agents.counts.bins`; every cell must lie inside the
    /// grid and off the depot and fuel stations.
    pub fn bin_positions(mut self, positions: Vec<Cell>) -> Self {
        self.bin_positions = Some(positions);
        self
    }

    /// Override the seed of the live phase.
    pub fn live_seed(mut self, seed: Option<u64>) -> Self {
        self.config.simulation.live_seed = seed;
        self
    }

    /// Validate the configuration, lay out the city and return a
    /// ready-to-run [`Sim`].
    ///
    /// Bootstrap draws from a generator seeded with `simulation.seed`, so
    /// the same seed always yields the same layout.  Everything after
    /// bootstrap draws from a separate live generator.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        let map = GridMap::from_config(&self.config);
        let requested = self.config.agents.counts.bins as usize;

        let bins = match self.bin_positions {
            Some(cells) => {
                if cells.len() != requested {
                    return Err(SimError::CountMismatch {
                        expected: requested,
                        got:      cells.len(),
                        what:     "bin positions",
                    });
                }
                if let Some(&bad) = cells.iter().find(|c| !c.within(map.size) || map.is_facility(**c)) {
                    return Err(SimError::InvalidPosition(bad));
                }
                cells
            }
            None => {
                let mut bootstrap = SimRng::new(self.config.simulation.seed);
                place_bins(&map, requested, self.config.agents.bin.min_distance, &mut bootstrap)?
            }
        };
        info!(bins = bins.len(), trucks = self.config.agents.counts.trucks, seed = self.config.simulation.seed, "city laid out");

        let mut live = SimRng::seeded_or_entropy(self.config.simulation.live_seed);
        let config = Arc::new(self.config);
        let world = World::new(Arc::clone(&config), live.child(0));
        Ok(Sim::new(config, world, bins, live))
    }
}

/// Scatter `count` bins over free cells at least `min_distance` apart
/// (Chebyshev), never on the depot or a fuel station.
pub fn place_bins(
    map:          &GridMap,
    count:        usize,
    min_distance: u32,
    rng:          &mut SimRng,
) -> SimResult<Vec<Cell>> {
    let spacing = min_distance.max(1);
    let budget = ATTEMPTS_PER_BIN * count.max(1);
    let mut placed: Vec<Cell> = Vec::with_capacity(count);

    for _ in 0..budget {
        if placed.len() == count {
            break;
        }
        let cell = map.random_cell(rng);
        if map.is_facility(cell) {
            continue;
        }
        if placed.iter().all(|p| p.chebyshev(cell) >= spacing) {
            placed.push(cell);
        }
    }

    if placed.len() < count {
        return Err(SimError::Placement { placed: placed.len(), requested: count });
    }
    Ok(placed)
}

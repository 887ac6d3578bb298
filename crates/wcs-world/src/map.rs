//! Static city layout.

use wcs_core::{Cell, SimConfig, SimRng};

/// Grid dimensions and the fixed facilities on it.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap {
    pub size:          u32,
    pub depot:         Cell,
    pub fuel_stations: Vec<Cell>,
}

impl GridMap {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            size:          config.grid.size,
            depot:         config.locations.depot,
            fuel_stations: config.locations.fuel_stations.clone(),
        }
    }

    /// `true` for the depot and every fuel station.
    #[inline]
    pub fn is_facility(&self, cell: Cell) -> bool {
        cell == self.depot || self.fuel_stations.contains(&cell)
    }

    #[inline]
    pub fn cell_count(&self) -> u64 {
        self.size as u64 * self.size as u64
    }

    /// A uniformly random cell.
    pub fn random_cell(&self, rng: &mut SimRng) -> Cell {
        let max = self.size.max(1) as i32;
        Cell::new(rng.gen_range(0..max), rng.gen_range(0..max))
    }

    /// Number of distinct facility cells on the grid.
    pub fn facility_count(&self) -> u64 {
        let mut cells: Vec<Cell> = Vec::with_capacity(self.fuel_stations.len() + 1);
        for &c in std::iter::once(&self.depot).chain(&self.fuel_stations) {
            if c.within(self.size) && !cells.contains(&c) {
                cells.push(c);
            }
        }
        cells.len() as u64
    }

    /// A uniformly random cell that is neither the depot nor a fuel station.
    /// Returns `None` when every cell is a facility.
    pub fn random_free_cell(&self, rng: &mut SimRng) -> Option<Cell> {
        if self.cell_count() <= self.facility_count() {
            return None;
        }
        loop {
            let cell = self.random_cell(rng);
            if !self.is_facility(cell) {
                return Some(cell);
            }
        }
    }
}

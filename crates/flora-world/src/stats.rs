//! Aggregate statistics over a grid.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub total_plant: f64,
    pub total_soil: f64,
    /// Cells with remaining lifetime
    pub living_cells: usize,
    /// Cells holding any plant biomass, alive or not
    pub vegetated_cells: usize,
    pub negative_soil_cells: usize,
    pub max_plant: f64,
}

impl GridStats {
    pub fn collect(grid: &Grid) -> Self {
        grid.cells().iter().fold(Self::default(), |mut stats, cell| {
            stats.total_plant += cell.plant;
            stats.total_soil += cell.soil;
            if cell.is_alive() {
                stats.living_cells += 1;
            }
            if cell.has_plant() {
                stats.vegetated_cells += 1;
            }
            if cell.soil < 0.0 {
                stats.negative_soil_cells += 1;
            }
            stats.max_plant = stats.max_plant.max(cell.plant);
            stats
        })
    }

    /// Plant plus soil over the whole grid
    pub fn total_mass(&self) -> f64 {
        self.total_plant + self.total_soil
    }
}

//! Initial soil and seed placement.

use crate::grid::Grid;
use flora_core::{Cell, PopulationConfig, Position, Result};
use rand::Rng;
use tracing::debug;

/// Overwrite every cell with fresh soil and drop `quantity` seed plants.
///
/// Seed positions are drawn with replacement, so fewer than `quantity`
/// distinct cells may end up planted. Returns the drawn positions in order.
pub fn populate<R: Rng + ?Sized>(
    grid: &mut Grid,
    params: &PopulationConfig,
    rng: &mut R,
) -> Result<Vec<Position>> {
    params.validate()?;

    for pos in grid.positions() {
        let soil = if params.soil_low == params.soil_high {
            params.soil_low
        } else {
            rng.gen_range(params.soil_low..=params.soil_high)
        };
        *grid.cell_mut(pos) = Cell::soil(soil);
    }

    let size = grid.size();
    let mut seeds = Vec::with_capacity(params.quantity);
    for _ in 0..params.quantity {
        let pos = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        let cell = grid.cell_mut(pos);
        cell.plant = params.start_strength;
        cell.lifetime = params.start_lifetime;
        debug!(row = pos.row, col = pos.col, "Seed planted");
        seeds.push(pos);
    }

    Ok(seeds)
}

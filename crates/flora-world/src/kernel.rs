//! Per-tick update kernel.
//!
//! One call to [`update`] is one synchronous row-major pass over every cell.
//! Conditions are always evaluated on the pre-tick `live` grid, but the
//! deltas accumulate in `buffer`, and some of them land on neighbors that are
//! visited later in the same pass. A later cell may then read those partial
//! results back out of the buffer (decomposition moves the buffer's plant
//! value, not the live one). The traversal order is therefore part of the
//! rule and the pass cannot be split across threads.

use crate::grid::{moore_neighbors, Grid};
use flora_core::{Cell, EcosystemConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Plant biomass injected when a seed germinates
pub const SEED_INCREMENT: f64 = 0.004;

/// Event counts for one kernel pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Rain fell on this pass
    pub rained: bool,
    /// Cells where a new plant germinated
    pub germinations: usize,
    /// Dead plants returned to the soil
    pub decompositions: usize,
}

/// Apply one tick of ecosystem dynamics.
///
/// `buffer` must be an exact copy of `live` on entry; `live` is not touched.
/// `counter` is the tick number of the pass being computed and gates rain.
pub fn update<R: Rng + ?Sized>(
    live: &Grid,
    buffer: &mut Grid,
    counter: u64,
    config: &EcosystemConfig,
    rng: &mut R,
) -> PassReport {
    debug_assert_eq!(live.size(), buffer.size());

    let size = live.size();
    let mut report = PassReport {
        rained: counter % config.rain_interval == 0,
        ..Default::default()
    };
    let rainfall = config.rain_amount_per_tick * config.rain_interval as f64;

    for pos in live.positions() {
        let cell = *live.cell(pos);

        if report.rained {
            buffer.cell_mut(pos).soil += rainfall;
        }

        if self_dynamics(&cell, buffer.cell_mut(pos), config) {
            report.decompositions += 1;
        }

        let mut fertilized = false;
        for ne_pos in moore_neighbors(pos, size) {
            let neighbor = live.cell(ne_pos);

            // Root spread: the neighbor's plant draws nutrient out of this cell
            if neighbor.plant > 0.0 && neighbor.plant <= config.plant_limit && cell.soil > 0.0 {
                let amount =
                    config.soil_cost * config.ne_soil_scale * consumption_factor(cell.plant, config);
                buffer.cell_mut(ne_pos).plant += amount;
                buffer.cell_mut(pos).soil -= amount;
            }

            if !fertilized
                && cell.soil >= config.min_soil
                && cell.plant == 0.0
                && neighbor.plant >= config.min_plant_maturity
            {
                fertilized = true;
            }
        }

        if fertilized {
            let lifetime = lifetime_draw(rng, config.lifetime_mean, config.lifetime_sigma);
            let target = buffer.cell_mut(pos);
            target.plant += SEED_INCREMENT;
            target.soil -= SEED_INCREMENT;
            target.lifetime += lifetime;
            report.germinations += 1;
            trace!(row = pos.row, col = pos.col, lifetime, "Seed germinated");
        }

        if cell.lifetime > 0.0 {
            buffer.cell_mut(pos).lifetime -= 1.0;
        }
    }

    report
}

/// Growth, decomposition or leaching of a single cell. Returns true when a
/// dead plant was decomposed.
fn self_dynamics(cell: &Cell, target: &mut Cell, config: &EcosystemConfig) -> bool {
    if cell.plant > 0.0 && cell.lifetime > 0.0 {
        target.plant = (target.plant - config.plant_decay).max(0.0);
        if cell.plant <= config.plant_limit && cell.soil > 0.0 {
            let soil_calc = config.soil_cost * consumption_factor(cell.plant, config);
            target.plant += soil_calc;
            target.soil -= soil_calc;
        }
        false
    } else if cell.plant > 0.0 && cell.lifetime == 0.0 {
        target.soil += target.plant;
        target.plant = 0.0;
        true
    } else {
        if cell.soil > 0.0 {
            target.soil -= config.soil_decay;
        }
        false
    }
}

/// Interpolate from `soil_scale` for a seedling up to 1 for a plant at the limit
fn consumption_factor(plant: f64, config: &EcosystemConfig) -> f64 {
    let t = plant / config.plant_limit;
    (1.0 - t) * config.soil_scale + t
}

/// Gaussian lifetime rounded to whole ticks, never negative
fn lifetime_draw<R: Rng + ?Sized>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    (mean + sigma * standard_normal(rng)).round().max(0.0)
}

/// Box-Muller transform
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

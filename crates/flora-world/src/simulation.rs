//! Simulation driver: owns the live grid, its buffer and the random source.

use crate::grid::Grid;
use crate::kernel::{self, PassReport};
use crate::population;
use crate::stats::GridStats;
use flora_core::{Error, PopulationConfig, Position, Result, SimulationConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

/// Format version of [`SimulationState`]
pub const STATE_VERSION: u32 = 1;

pub struct Simulation {
    config: SimulationConfig,
    live: Grid,
    buffer: Grid,
    rng: ChaCha8Rng,
    tick: u64,
    initialized: bool,
}

impl Simulation {
    /// Build an instance with a zeroed grid. Call [`Simulation::initialize`]
    /// before the first tick.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.ecosystem.validate()?;
        let live = Grid::new(config.ecosystem.size)?;
        let buffer = live.clone();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            live,
            buffer,
            rng,
            tick: 0,
            initialized: false,
        })
    }

    /// Build an instance and populate it from `config.population`
    pub fn seeded(config: SimulationConfig) -> Result<Self> {
        let population = config.population.clone();
        let mut sim = Self::new(config)?;
        sim.initialize(&population)?;
        Ok(sim)
    }

    /// Build an instance around a prepared grid, skipping the initializer
    pub fn with_grid(config: SimulationConfig, grid: Grid) -> Result<Self> {
        let mut sim = Self::new(config)?;
        if grid.size() != sim.live.size() {
            return Err(Error::InvalidConfiguration(format!(
                "grid size {} does not match configured size {}",
                grid.size(),
                sim.live.size()
            )));
        }
        sim.live = grid;
        sim.initialized = true;
        Ok(sim)
    }

    /// Seed soil and starting plants. Allowed once, before any tick.
    #[instrument(skip(self, params), fields(quantity = params.quantity, seed = self.config.seed))]
    pub fn initialize(&mut self, params: &PopulationConfig) -> Result<Vec<Position>> {
        if self.initialized || self.tick > 0 {
            return Err(Error::InvalidState(
                "population can only be initialized once, before the first tick".to_string(),
            ));
        }

        let seeds = population::populate(&mut self.live, params, &mut self.rng)?;
        self.initialized = true;

        info!(
            size = self.live.size(),
            seeds = seeds.len(),
            soil_low = params.soil_low,
            soil_high = params.soil_high,
            "Population initialized"
        );
        Ok(seeds)
    }

    /// Advance by one tick. The population must have been initialized.
    pub fn tick(&mut self) -> Result<PassReport> {
        if !self.initialized {
            return Err(Error::InvalidState(
                "tick called before the population was initialized".to_string(),
            ));
        }
        self.tick += 1;
        self.buffer.copy_from(&self.live);

        let report = kernel::update(
            &self.live,
            &mut self.buffer,
            self.tick,
            &self.config.ecosystem,
            &mut self.rng,
        );
        std::mem::swap(&mut self.live, &mut self.buffer);

        if report.rained {
            debug!(tick = self.tick, "Rain fell");
        }
        trace!(
            tick = self.tick,
            germinations = report.germinations,
            decompositions = report.decompositions,
            "Tick complete"
        );
        Ok(report)
    }

    /// Read-only view of the live grid
    pub fn snapshot(&self) -> &Grid {
        &self.live
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> GridStats {
        GridStats::collect(&self.live)
    }

    /// Capture everything needed to continue this run elsewhere
    pub fn state(&self) -> SimulationState {
        SimulationState {
            version: STATE_VERSION,
            config: self.config.clone(),
            tick: self.tick,
            grid: self.live.clone(),
            rng: self.rng.clone(),
        }
    }

    /// Resume from a captured state; subsequent ticks match the original run
    pub fn from_state(state: SimulationState) -> Result<Self> {
        if state.version != STATE_VERSION {
            return Err(Error::InvalidState(format!(
                "unsupported state version {}",
                state.version
            )));
        }
        state.config.ecosystem.validate()?;
        state.grid.validate()?;
        if state.grid.size() != state.config.ecosystem.size {
            return Err(Error::InvalidState(format!(
                "grid size {} does not match configured size {}",
                state.grid.size(),
                state.config.ecosystem.size
            )));
        }

        let buffer = state.grid.clone();
        Ok(Self {
            config: state.config,
            live: state.grid,
            buffer,
            rng: state.rng,
            tick: state.tick,
            initialized: true,
        })
    }
}

/// Serializable snapshot of a running simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub version: u32,
    pub config: SimulationConfig,
    pub tick: u64,
    pub grid: Grid,
    pub rng: ChaCha8Rng,
}

impl SimulationState {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

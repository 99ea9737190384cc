//! Configuration types for the simulation.

use crate::{cell_count, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ecosystem constants consumed by the update kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcosystemConfig {
    /// Side length of the square grid
    pub size: usize,
    /// Nominal maximum plant biomass
    pub plant_limit: f64,
    /// Soil consumed per tick by a plant feeding on its own cell
    pub soil_cost: f64,
    /// Scale applied to soil drawn by a neighboring plant's roots
    pub ne_soil_scale: f64,
    /// Consumption factor of a seedling relative to a fully grown plant
    pub soil_scale: f64,
    /// Plant biomass needed before a plant can fertilize neighbors
    pub min_plant_maturity: f64,
    /// Soil needed in an empty cell for a seed to germinate
    pub min_soil: f64,
    /// Ticks between rain events
    pub rain_interval: u64,
    /// Rain per tick, delivered in bulk every `rain_interval` ticks
    pub rain_amount_per_tick: f64,
    /// Biomass lost each tick by a living plant
    pub plant_decay: f64,
    /// Soil lost each tick by bare ground
    pub soil_decay: f64,
    /// Mean lifetime of a germinated plant, in whole ticks (draws are rounded)
    pub lifetime_mean: f64,
    /// Standard deviation of a germinated plant's lifetime
    pub lifetime_sigma: f64,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            size: 200,
            plant_limit: 255.0,
            soil_cost: 20.0,
            ne_soil_scale: 0.25,
            soil_scale: 0.25,
            min_plant_maturity: 128.0,
            min_soil: 16.0,
            rain_interval: 400,
            rain_amount_per_tick: 0.05,
            plant_decay: 0.5,
            soil_decay: 0.01,
            lifetime_mean: 30.0,
            lifetime_sigma: 5.0,
        }
    }
}

impl EcosystemConfig {
    /// Reject constants the kernel cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidConfiguration(
                "grid size must be positive".to_string(),
            ));
        }
        if cell_count(self.size).is_none() {
            return Err(Error::InvalidConfiguration(format!(
                "grid size {} is too large",
                self.size
            )));
        }
        if self.rain_interval == 0 {
            return Err(Error::InvalidConfiguration(
                "rain_interval must be positive".to_string(),
            ));
        }
        if !self.plant_limit.is_finite() || self.plant_limit <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "plant_limit must be a positive number, got {}",
                self.plant_limit
            )));
        }
        let mean = self.lifetime_mean;
        if !mean.is_finite() || mean < 0.0 || mean.fract() != 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "lifetime_mean must be a whole number of ticks, got {}",
                self.lifetime_mean
            )));
        }
        if !self.lifetime_sigma.is_finite() || self.lifetime_sigma < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "lifetime_sigma must be non-negative, got {}",
                self.lifetime_sigma
            )));
        }
        Ok(())
    }
}

/// Initial population parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of seed plants (positions drawn with replacement)
    pub quantity: usize,
    /// Starting biomass of a seed plant
    pub start_strength: f64,
    /// Starting lifetime of a seed plant
    pub start_lifetime: f64,
    /// Lower bound of the initial soil distribution
    pub soil_low: f64,
    /// Upper bound of the initial soil distribution
    pub soil_high: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            quantity: 5,
            start_strength: 128.0,
            start_lifetime: 10.0,
            soil_low: 100.0,
            soil_high: 160.0,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.soil_low.is_finite() || !self.soil_high.is_finite() {
            return Err(Error::InvalidConfiguration(
                "soil range bounds must be finite".to_string(),
            ));
        }
        if self.soil_low > self.soil_high {
            return Err(Error::InvalidConfiguration(format!(
                "soil range is empty: [{}, {}]",
                self.soil_low, self.soil_high
            )));
        }
        Ok(())
    }
}

/// Everything needed to build one simulation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub ecosystem: EcosystemConfig,
    pub population: PopulationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ecosystem: EcosystemConfig::default(),
            population: PopulationConfig::default(),
        }
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Ticks to run in this invocation; `None` runs until shutdown is requested
    pub num_ticks: Option<u64>,
    /// Upper bound on the tick rate; `None` runs unthrottled
    pub ticks_per_second: Option<u32>,
    /// Ticks between ecosystem metric reports
    pub report_interval: u64,
    /// Ticks between checkpoints (0 disables periodic checkpoints)
    pub checkpoint_interval: u64,
    /// Checkpoint directory
    pub checkpoint_dir: String,
    /// Number of checkpoints retained on disk
    pub keep_checkpoints: usize,
    /// Resume from the latest checkpoint instead of seeding a new grid
    pub resume: bool,
    pub simulation: SimulationConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            num_ticks: None,
            ticks_per_second: Some(500),
            report_interval: 50,
            checkpoint_interval: 1000,
            checkpoint_dir: "./data/checkpoints".to_string(),
            keep_checkpoints: 5,
            resume: false,
            simulation: SimulationConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: RunnerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.keep_checkpoints == 0 {
            return Err(Error::InvalidConfiguration(
                "keep_checkpoints must be at least 1".to_string(),
            ));
        }
        self.simulation.ecosystem.validate()?;
        self.simulation.population.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let ecosystem = EcosystemConfig::default();
        assert_eq!(ecosystem.size, 200);
        assert_eq!(ecosystem.rain_interval, 400);
        assert!(ecosystem.validate().is_ok());

        let population = PopulationConfig::default();
        assert_eq!(population.quantity, 5);
        assert!(population.validate().is_ok());

        let runner = RunnerConfig::default();
        assert_eq!(runner.report_interval, 50);
        assert!(runner.num_ticks.is_none());
    }

    #[test]
    fn test_zero_size_rejected() {
        let config = EcosystemConfig {
            size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let config = EcosystemConfig {
            size: 1usize << 32,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_fractional_lifetime_mean_rejected() {
        let config = EcosystemConfig {
            lifetime_mean: 30.4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));

        let whole = EcosystemConfig {
            lifetime_mean: 12.0,
            ..Default::default()
        };
        assert!(whole.validate().is_ok());
    }

    #[test]
    fn test_keep_checkpoints_must_be_positive() {
        let config = RunnerConfig {
            keep_checkpoints: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(RunnerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_validates() {
        let path = std::env::temp_dir().join(format!("flora-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "keep_checkpoints": 0 }"#).unwrap();
        let result = RunnerConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_bad_constants_rejected() {
        let no_rain = EcosystemConfig {
            rain_interval: 0,
            ..Default::default()
        };
        assert!(no_rain.validate().is_err());

        let zero_limit = EcosystemConfig {
            plant_limit: 0.0,
            ..Default::default()
        };
        assert!(zero_limit.validate().is_err());

        let negative_sigma = EcosystemConfig {
            lifetime_sigma: -1.0,
            ..Default::default()
        };
        assert!(negative_sigma.validate().is_err());
    }

    #[test]
    fn test_inverted_soil_range_rejected() {
        let population = PopulationConfig {
            soil_low: 160.0,
            soil_high: 100.0,
            ..Default::default()
        };
        assert!(matches!(
            population.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "num_ticks": 20, "simulation": { "seed": 7, "ecosystem": { "size": 32 } } }"#;
        let config: RunnerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.num_ticks, Some(20));
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.ecosystem.size, 32);
        assert_eq!(config.simulation.ecosystem.plant_limit, 255.0);
        assert_eq!(config.simulation.population, PopulationConfig::default());
    }
}

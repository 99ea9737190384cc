use flora_core::{Cell, EcosystemConfig, PopulationConfig, Position, SimulationConfig};
use flora_world::{GridStats, Simulation};
use proptest::prelude::*;

fn config(size: usize, seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed,
        ecosystem: EcosystemConfig {
            size,
            ..Default::default()
        },
        population: PopulationConfig::default(),
    }
}

fn run(config: SimulationConfig, ticks: u64) -> Simulation {
    let mut sim = Simulation::seeded(config).unwrap();
    for _ in 0..ticks {
        sim.tick().unwrap();
    }
    sim
}

#[test]
fn test_same_seed_same_grid() {
    let a = run(config(40, 11), 60);
    let b = run(config(40, 11), 60);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_different_seed_different_grid() {
    let a = run(config(40, 11), 5);
    let b = run(config(40, 12), 5);
    assert_ne!(a.snapshot(), b.snapshot());
}

#[test]
fn test_mass_conserved_without_rain_or_decay() {
    let mut sim_config = config(12, 5);
    sim_config.ecosystem.plant_decay = 0.0;
    sim_config.ecosystem.soil_decay = 0.0;
    sim_config.ecosystem.rain_amount_per_tick = 0.0;

    let mut grid = flora_world::Grid::new(12).unwrap();
    for pos in grid.positions().collect::<Vec<_>>() {
        grid.set(pos, Cell::soil(100.0)).unwrap();
    }
    grid.set(Position::new(6, 6), Cell::new(128.0, 100.0, 10.0)).unwrap();

    let mut sim = Simulation::with_grid(sim_config, grid).unwrap();
    let before = sim.stats().total_mass();
    let mut germinations = 0;
    let mut decompositions = 0;
    for _ in 0..100 {
        let report = sim.tick().unwrap();
        germinations += report.germinations;
        decompositions += report.decompositions;
    }
    let after = sim.stats().total_mass();

    assert!(germinations > 0);
    assert!(decompositions > 0);
    assert!(
        (after - before).abs() < 1e-6 * before,
        "mass drifted from {} to {}",
        before,
        after
    );
}

#[test]
fn test_rain_every_400_ticks() {
    let mut sim_config = config(6, 1);
    sim_config.ecosystem.soil_decay = 0.0;
    sim_config.population = PopulationConfig {
        quantity: 0,
        soil_low: 50.0,
        soil_high: 50.0,
        ..Default::default()
    };
    let rainfall = sim_config.ecosystem.rain_amount_per_tick * 400.0 * 36.0;

    let mut sim = Simulation::seeded(sim_config).unwrap();
    let mut previous = sim.stats().total_soil;
    for _ in 0..800 {
        let report = sim.tick().unwrap();
        let soil = sim.stats().total_soil;
        if sim.tick_count() % 400 == 0 {
            assert!(report.rained);
            assert!((soil - previous - rainfall).abs() < 1e-6, "tick {}", sim.tick_count());
        } else {
            assert!(!report.rained);
            assert_eq!(soil, previous, "tick {}", sim.tick_count());
        }
        previous = soil;
    }
}

#[test]
fn test_default_run_stays_finite() {
    let sim = run(config(50, 42), 200);
    let stats: GridStats = sim.stats();
    assert!(stats.total_plant.is_finite());
    assert!(stats.total_soil.is_finite());
    assert!(sim
        .snapshot()
        .cells()
        .iter()
        .all(|c| c.lifetime >= 0.0 && c.lifetime.fract() == 0.0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_shape_invariant(size in 1usize..12, ticks in 0u64..20, seed in any::<u64>()) {
        let sim = run(config(size, seed), ticks);
        prop_assert_eq!(sim.snapshot().size(), size);
        prop_assert_eq!(sim.snapshot().cells().len(), size * size);
        prop_assert_eq!(sim.snapshot().rows().count(), size);
        prop_assert_eq!(sim.tick_count(), ticks);
    }
}

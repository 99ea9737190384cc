//! Headless runner for the Flora ecosystem simulation.

mod checkpoint;
mod driver;
mod telemetry;

use anyhow::Result;
use checkpoint::CheckpointManager;
use driver::Driver;
use flora_core::RunnerConfig;
use flora_world::Simulation;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            RunnerConfig::load(&path)?
        }
        None => RunnerConfig::default(),
    };

    info!(
        size = config.simulation.ecosystem.size,
        seed = config.simulation.seed,
        num_ticks = ?config.num_ticks,
        resume = config.resume,
        "Starting Flora runner"
    );

    let checkpoints = CheckpointManager::new(&config.checkpoint_dir);
    let simulation = if config.resume {
        checkpoints.restore_latest().await?
    } else {
        Simulation::seeded(config.simulation.clone())?
    };

    let mut driver = Driver::new(config, simulation, checkpoints);
    let summary = driver.run(shutdown_signal()).await?;

    info!(
        event = "run_summary",
        ticks_run = summary.ticks_run,
        final_tick = summary.final_tick,
        grid_size = driver.simulation().snapshot().size(),
        germinations = summary.germinations,
        decompositions = summary.decompositions,
        rain_events = summary.rain_events,
        living_cells = summary.stats.living_cells,
        total_plant = summary.stats.total_plant,
        total_soil = summary.stats.total_soil,
        "Run complete"
    );

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

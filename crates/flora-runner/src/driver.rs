//! Headless tick loop around a simulation.

use crate::checkpoint::CheckpointManager;
use flora_core::{Result, RunnerConfig};
use flora_world::{GridStats, PassReport, Simulation};
use std::future::Future;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Totals for one invocation of [`Driver::run`]
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub final_tick: u64,
    pub germinations: u64,
    pub decompositions: u64,
    pub rain_events: u64,
    pub stats: GridStats,
}

impl RunSummary {
    fn record(&mut self, report: &PassReport) {
        self.ticks_run += 1;
        self.germinations += report.germinations as u64;
        self.decompositions += report.decompositions as u64;
        if report.rained {
            self.rain_events += 1;
        }
    }
}

pub struct Driver {
    config: RunnerConfig,
    simulation: Simulation,
    checkpoints: CheckpointManager,
}

impl Driver {
    pub fn new(config: RunnerConfig, simulation: Simulation, checkpoints: CheckpointManager) -> Self {
        Self {
            config,
            simulation,
            checkpoints,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Tick until `num_ticks` have run or `shutdown` resolves. A tick that has
    /// started always completes; shutdown is only observed between ticks.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> Result<RunSummary> {
        tokio::pin!(shutdown);

        let target = self
            .config
            .num_ticks
            .map(|n| self.simulation.tick_count() + n);
        let mut pacer = self.config.ticks_per_second.filter(|rate| *rate > 0).map(build_pacer);
        let mut summary = RunSummary::default();

        info!(
            start_tick = self.simulation.tick_count(),
            target_tick = ?target,
            ticks_per_second = ?self.config.ticks_per_second,
            "Starting tick loop"
        );

        loop {
            if target.is_some_and(|t| self.simulation.tick_count() >= t) {
                break;
            }

            let stop = match pacer.as_mut() {
                Some(pacer) => tokio::select! {
                    biased;
                    _ = &mut shutdown => true,
                    _ = pacer.tick() => false,
                },
                None => tokio::select! {
                    biased;
                    _ = &mut shutdown => true,
                    _ = tokio::task::yield_now() => false,
                },
            };
            if stop {
                info!(tick = self.simulation.tick_count(), "Shutdown requested, stopping tick loop");
                break;
            }

            let report = self.simulation.tick()?;
            summary.record(&report);
            let tick = self.simulation.tick_count();

            if self.config.report_interval > 0 && tick % self.config.report_interval == 0 {
                self.emit_metrics(&report);
            }

            if self.config.checkpoint_interval > 0 && tick % self.config.checkpoint_interval == 0 {
                self.checkpoint().await;
            }
        }

        if summary.ticks_run > 0 {
            self.checkpoint().await;
        }

        summary.final_tick = self.simulation.tick_count();
        summary.stats = self.simulation.stats();
        Ok(summary)
    }

    /// Checkpoint failures are logged; the run continues
    async fn checkpoint(&self) {
        if let Err(e) = self.checkpoints.create_checkpoint(&self.simulation).await {
            error!("Failed to create checkpoint: {}", e);
            return;
        }
        if let Err(e) = self
            .checkpoints
            .cleanup_old_checkpoints(self.config.keep_checkpoints)
            .await
        {
            error!("Failed to clean up checkpoints: {}", e);
        }
    }

    fn emit_metrics(&self, report: &PassReport) {
        let stats = self.simulation.stats();
        let cells = (self.simulation.snapshot().size() * self.simulation.snapshot().size()) as f64;

        info!(
            event = "ecosystem_metrics",
            tick = self.simulation.tick_count(),
            total_plant = stats.total_plant,
            total_soil = stats.total_soil,
            living_cells = stats.living_cells,
            vegetated_cells = stats.vegetated_cells,
            negative_soil_cells = stats.negative_soil_cells,
            max_plant = stats.max_plant,
            mean_soil = stats.total_soil / cells,
            "Ecosystem metrics snapshot"
        );
        debug!(
            germinations = report.germinations,
            decompositions = report.decompositions,
            rained = report.rained,
            "Last tick events"
        );
    }
}

fn build_pacer(ticks_per_second: u32) -> Interval {
    let mut pacer = interval(Duration::from_secs_f64(1.0 / ticks_per_second as f64));
    pacer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    pacer
}

//! Checkpoint and restore functionality.

use flora_core::{Error, Result};
use flora_world::{Simulation, SimulationState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub timestamp: i64,
    pub state: SimulationState,
}

pub struct CheckpointManager {
    checkpoint_dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
        }
    }

    /// Write the simulation's current state to `checkpoint_{tick}.bin`
    pub async fn create_checkpoint(&self, simulation: &Simulation) -> Result<PathBuf> {
        fs::create_dir_all(&self.checkpoint_dir).await?;

        let checkpoint = Checkpoint {
            version: CHECKPOINT_VERSION,
            timestamp: chrono::Utc::now().timestamp(),
            state: simulation.state(),
        };

        let checkpoint_bytes = bincode::serialize(&checkpoint)
            .map_err(|e| Error::Serialization(format!("Failed to serialize checkpoint: {}", e)))?;

        let checkpoint_path = self
            .checkpoint_dir
            .join(format!("checkpoint_{}.bin", simulation.tick_count()));
        fs::write(&checkpoint_path, &checkpoint_bytes).await?;

        info!(tick = simulation.tick_count(), path = ?checkpoint_path, "Checkpoint created");
        Ok(checkpoint_path)
    }

    /// Restore a simulation from the checkpoint with the highest tick
    pub async fn restore_latest(&self) -> Result<Simulation> {
        let checkpoints = self.list_checkpoints().await?;

        let Some((path, _)) = checkpoints.into_iter().max_by_key(|(_, tick)| *tick) else {
            return Err(Error::NotFound(format!(
                "no checkpoints in {}",
                self.checkpoint_dir.display()
            )));
        };

        let simulation = self.restore_from_path(&path).await?;
        info!(tick = simulation.tick_count(), path = ?path, "Restored from checkpoint");
        Ok(simulation)
    }

    async fn restore_from_path(&self, path: &Path) -> Result<Simulation> {
        let bytes = fs::read(path).await?;
        let checkpoint: Checkpoint = bincode::deserialize(&bytes)
            .map_err(|e| Error::Serialization(format!("Failed to deserialize checkpoint: {}", e)))?;

        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(Error::InvalidState(format!(
                "unsupported checkpoint version {}",
                checkpoint.version
            )));
        }

        Simulation::from_state(checkpoint.state)
    }

    /// Clean up old checkpoints, keeping only the most recent N
    pub async fn cleanup_old_checkpoints(&self, keep_count: usize) -> Result<()> {
        let mut checkpoints = self.list_checkpoints().await?;
        if checkpoints.len() <= keep_count {
            return Ok(());
        }

        // Sort by tick descending
        checkpoints.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in checkpoints.iter().skip(keep_count) {
            if let Err(e) = fs::remove_file(path).await {
                warn!("Failed to remove old checkpoint {:?}: {}", path, e);
            } else {
                info!("Removed old checkpoint: {:?}", path);
            }
        }

        Ok(())
    }

    async fn list_checkpoints(&self) -> Result<Vec<(PathBuf, u64)>> {
        if !self.checkpoint_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.checkpoint_dir).await?;
        let mut checkpoints = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let tick = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| name.strip_prefix("checkpoint_"))
                .and_then(|s| s.strip_suffix(".bin"))
                .and_then(|s| s.parse::<u64>().ok());
            if let Some(tick) = tick {
                checkpoints.push((path, tick));
            }
        }

        Ok(checkpoints)
    }
}

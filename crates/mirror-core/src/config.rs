//! Sync engine configuration
//!
//! Defaults for chunking, batching, and checkpoint persistence.

use mirror_common::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Policy applied when a stored checkpoint cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorruptCheckpointPolicy {
    /// Treat the checkpoint as absent and restart from scratch (logged)
    #[default]
    StartFresh,
    /// Surface a hard error and leave the run to operator intervention
    Fail,
}

impl std::str::FromStr for CorruptCheckpointPolicy {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "start_fresh" | "start-fresh" => Ok(CorruptCheckpointPolicy::StartFresh),
            "fail" => Ok(CorruptCheckpointPolicy::Fail),
            _ => Err(MirrorError::config(format!(
                "Invalid corrupt-checkpoint policy: {}. Must be 'start_fresh' or 'fail'",
                s
            ))),
        }
    }
}

/// Main sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory holding one JSON checkpoint document per identity
    pub checkpoint_dir: PathBuf,
    /// Default number of records per full-load chunk
    pub chunk_size: usize,
    /// Default number of records per incremental batch
    pub batch_size: usize,
    /// Safety cap on incremental batches per invocation
    pub max_batches_per_run: usize,
    /// What to do when a stored checkpoint is unparsable
    pub on_corrupt_checkpoint: CorruptCheckpointPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("./checkpoints"),
            chunk_size: 10_000,
            batch_size: 1_000,
            max_batches_per_run: 100,
            on_corrupt_checkpoint: CorruptCheckpointPolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Load sync configuration from environment variables
    ///
    /// Environment variables:
    /// - `MIRROR_CHECKPOINT_DIR`: checkpoint directory (default `./checkpoints`)
    /// - `MIRROR_CHUNK_SIZE`: full-load chunk size (default 10000)
    /// - `MIRROR_BATCH_SIZE`: incremental batch size (default 1000)
    /// - `MIRROR_MAX_BATCHES_PER_RUN`: incremental safety cap (default 100)
    /// - `MIRROR_ON_CORRUPT_CHECKPOINT`: `start_fresh` or `fail`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("MIRROR_CHECKPOINT_DIR") {
            config.checkpoint_dir = PathBuf::from(dir);
        }

        if let Ok(size) = std::env::var("MIRROR_CHUNK_SIZE") {
            config.chunk_size = size
                .parse()
                .map_err(|_| MirrorError::config(format!("Invalid MIRROR_CHUNK_SIZE: {}", size)))?;
        }

        if let Ok(size) = std::env::var("MIRROR_BATCH_SIZE") {
            config.batch_size = size
                .parse()
                .map_err(|_| MirrorError::config(format!("Invalid MIRROR_BATCH_SIZE: {}", size)))?;
        }

        if let Ok(cap) = std::env::var("MIRROR_MAX_BATCHES_PER_RUN") {
            config.max_batches_per_run = cap.parse().map_err(|_| {
                MirrorError::config(format!("Invalid MIRROR_MAX_BATCHES_PER_RUN: {}", cap))
            })?;
        }

        if let Ok(policy) = std::env::var("MIRROR_ON_CORRUPT_CHECKPOINT") {
            config.on_corrupt_checkpoint = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(MirrorError::config("MIRROR_CHUNK_SIZE must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(MirrorError::config("MIRROR_BATCH_SIZE must be greater than 0"));
        }
        if self.max_batches_per_run == 0 {
            return Err(MirrorError::config(
                "MIRROR_MAX_BATCHES_PER_RUN must be greater than 0",
            ));
        }
        Ok(())
    }
}

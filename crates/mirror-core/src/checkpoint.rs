//! Checkpoint persistence
//!
//! A checkpoint records the last successfully processed position for a
//! load identity, enabling resumption. Stores are plain key-value
//! persistence behind [`CheckpointStore`]; the composed identity string
//! is injective over its components, so unrelated runs sharing a job id
//! prefix can never collide.
//!
//! A checkpoint is written strictly after its batch has been applied to
//! the target. Writes are not atomic across a process crash; the worst
//! case is reprocessing of the last batch, never data loss.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mirror_common::{MirrorError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::config::CorruptCheckpointPolicy;
use crate::types::KeyValue;

/// Identity of a checkpoint document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointKey {
    /// Full load position for a (job, table) pair
    FullLoad { job_id: String, table: String },
    /// Incremental high-water mark for the full source/target identity
    Incremental {
        job_id: String,
        source: String,
        source_table: String,
        target: String,
        target_table: String,
        key_column: String,
    },
}

impl CheckpointKey {
    pub fn full_load(job_id: impl Into<String>, table: impl Into<String>) -> Self {
        CheckpointKey::FullLoad {
            job_id: job_id.into(),
            table: table.into(),
        }
    }

    pub fn incremental(
        job_id: impl Into<String>,
        source: impl Into<String>,
        source_table: impl Into<String>,
        target: impl Into<String>,
        target_table: impl Into<String>,
        key_column: impl Into<String>,
    ) -> Self {
        CheckpointKey::Incremental {
            job_id: job_id.into(),
            source: source.into(),
            source_table: source_table.into(),
            target: target.into(),
            target_table: target_table.into(),
            key_column: key_column.into(),
        }
    }

    fn components(&self) -> Vec<&str> {
        match self {
            CheckpointKey::FullLoad { job_id, table } => vec!["full_load", job_id, table],
            CheckpointKey::Incremental {
                job_id,
                source,
                source_table,
                target,
                target_table,
                key_column,
            } => vec![
                "inc_load",
                job_id,
                source,
                source_table,
                target,
                target_table,
                key_column,
            ],
        }
    }

    /// Filesystem-safe storage key, injective over the identity components
    ///
    /// The readable prefix is each component sanitized and joined with
    /// underscores; the suffix is a digest over the length-prefixed raw
    /// components, which disambiguates tuples whose sanitized join would
    /// otherwise collide.
    pub fn storage_key(&self) -> String {
        let components = self.components();

        let mut hasher = Sha256::new();
        for component in &components {
            hasher.update((component.len() as u64).to_le_bytes());
            hasher.update(component.as_bytes());
        }
        let digest = hasher.finalize();

        let readable: Vec<String> = components.iter().map(|c| sanitize(c)).collect();
        format!("{}-{}", readable.join("_"), hex::encode(&digest[..8]))
    }
}

impl std::fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.storage_key())
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Key-value persistence for checkpoint documents
///
/// Implementations only move strings; serialization, parsing, and the
/// corrupt-checkpoint policy live in [`save_checkpoint`] and
/// [`load_checkpoint`].
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Persist `contents` at `key`, overwriting unconditionally
    async fn save_raw(&self, key: &CheckpointKey, contents: String) -> Result<()>;

    /// Fetch the stored document for `key`, or `None` if absent
    async fn load_raw(&self, key: &CheckpointKey) -> Result<Option<String>>;
}

/// Serialize and persist a checkpoint document
pub async fn save_checkpoint<T: Serialize>(
    store: &dyn CheckpointStore,
    key: &CheckpointKey,
    data: &T,
) -> Result<()> {
    let contents = serde_json::to_string_pretty(data)?;
    debug!(key = %key, "Saving checkpoint");
    store.save_raw(key, contents).await
}

/// Load and parse a checkpoint document
///
/// An unparsable document is handled per `policy`: `StartFresh` logs a
/// warning and reports the checkpoint as absent; `Fail` surfaces
/// [`MirrorError::CheckpointCorrupt`].
pub async fn load_checkpoint<T: DeserializeOwned>(
    store: &dyn CheckpointStore,
    key: &CheckpointKey,
    policy: CorruptCheckpointPolicy,
) -> Result<Option<T>> {
    let Some(contents) = store.load_raw(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&contents) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => match policy {
            CorruptCheckpointPolicy::StartFresh => {
                warn!(key = %key, error = %e, "Corrupt checkpoint, starting from scratch");
                Ok(None)
            },
            CorruptCheckpointPolicy::Fail => Err(MirrorError::CheckpointCorrupt {
                key: key.storage_key(),
                reason: e.to_string(),
            }),
        },
    }
}

/// Full-load checkpoint: exclusive upper bound already processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullLoadCheckpoint {
    pub last_id: KeyValue,
    pub timestamp: DateTime<Utc>,
}

/// Incremental checkpoint: highest key value already upserted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalCheckpoint {
    pub last_value: KeyValue,
    pub last_sync_timestamp: DateTime<Utc>,
}

/// Checkpoint store backed by one JSON file per identity
#[derive(Debug)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &CheckpointKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.storage_key()))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save_raw(&self, key: &CheckpointKey, contents: String) -> Result<()> {
        let path = self.path_for(key);
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }

    async fn load_raw(&self, key: &CheckpointKey) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory checkpoint store for tests and embedders
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn save_raw(&self, key: &CheckpointKey, contents: String) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.storage_key(), contents);
        Ok(())
    }

    async fn load_raw(&self, key: &CheckpointKey) -> Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&key.storage_key())
            .cloned())
    }
}

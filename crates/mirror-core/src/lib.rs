//! DataMirror Core
//!
//! Checkpointed, resumable load orchestration for data mirroring.
//!
//! # Overview
//!
//! The core drives two kinds of loads over pluggable source/target
//! adapters:
//!
//! - **Full load**: chunked extraction over a numeric primary-key range,
//!   with a checkpoint after every applied chunk
//! - **Incremental load**: batched change capture above a persisted
//!   high-water mark, upserted idempotently into the target
//!
//! Job lifecycle state lives in the in-process [`JobStore`]; resumption
//! positions live in a [`CheckpointStore`] (file-backed by default). A
//! checkpoint is only written after its batch has been durably applied,
//! so a crash costs at most one reprocessed batch and never loses data.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mirror_core::{
//!     ConnectionConfig, FileCheckpointStore, FullLoadOptions, JobStore, SimulatedSource,
//!     SimulatedTarget, SyncConfig, SyncEngine,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> mirror_common::Result<()> {
//!     let config = SyncConfig::default();
//!     let checkpoints = Arc::new(FileCheckpointStore::new(&config.checkpoint_dir)?);
//!     let engine = SyncEngine::new(Arc::new(JobStore::new()), checkpoints, config);
//!
//!     let source_config: ConnectionConfig = serde_json::from_str(
//!         r#"{"type": "relational", "host": "src.internal"}"#,
//!     )?;
//!     let target_config: ConnectionConfig = serde_json::from_str(
//!         r#"{"type": "relational", "host": "tgt.internal"}"#,
//!     )?;
//!
//!     let source = SimulatedSource::new(&source_config).with_row_count(25_000);
//!     let target = SimulatedTarget::new(&target_config);
//!
//!     let summary = engine
//!         .full_load(
//!             "job-1",
//!             &source,
//!             &target,
//!             "customers",
//!             &FullLoadOptions::default(),
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!     println!("processed {} records", summary.processed_records);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod full_load;
pub mod incremental;
pub mod job_store;
pub mod sim;
pub mod types;

// Re-export commonly used types
pub use adapter::{SourceAdapter, TargetAdapter};
pub use checkpoint::{
    load_checkpoint, save_checkpoint, CheckpointKey, CheckpointStore, FileCheckpointStore,
    FullLoadCheckpoint, IncrementalCheckpoint, MemoryCheckpointStore,
};
pub use config::{CorruptCheckpointPolicy, SyncConfig};
pub use engine::SyncEngine;
pub use full_load::{FullLoadOptions, FullLoadStatus, FullLoadSummary};
pub use incremental::{IncrementalLoadOptions, IncrementalOutcome, IncrementalSummary};
pub use job_store::{JobStatusStore, JobStore};
pub use sim::{SimulatedSource, SimulatedTarget};
pub use types::{
    record_key_value, ConnectionConfig, JobRecord, JobState, JobUpdate, KeyValue, Record, TableInfo,
};

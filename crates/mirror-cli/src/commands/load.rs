//! Load commands
//!
//! Run the sync engine in-process against the simulated adapters and
//! print the result summary as JSON. Checkpoints are shared through the
//! configured checkpoint directory, so re-running with the same job id
//! resumes where the previous invocation stopped.

use anyhow::Result;
use mirror_core::{
    ConnectionConfig, FileCheckpointStore, FullLoadOptions, IncrementalLoadOptions, JobStore,
    SimulatedSource, SimulatedTarget, SyncConfig, SyncEngine,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn build_engine() -> Result<SyncEngine> {
    let config = SyncConfig::from_env()?;
    let checkpoints = Arc::new(FileCheckpointStore::new(&config.checkpoint_dir)?);
    Ok(SyncEngine::new(Arc::new(JobStore::new()), checkpoints, config))
}

fn sim_connection(name: &str) -> ConnectionConfig {
    ConnectionConfig::Relational {
        host: format!("{}.sim.local", name),
        port: Some(5432),
        user: None,
        password: None,
        database: Some("mirror".to_string()),
        name: Some(name.to_string()),
    }
}

fn job_id_or_generated(job_id: Option<String>) -> String {
    job_id.unwrap_or_else(|| format!("job-{}", Uuid::new_v4()))
}

/// Run a full table load
pub async fn full_load(
    table: String,
    job_id: Option<String>,
    chunk_size: Option<usize>,
    compress: bool,
    rows: Option<u64>,
) -> Result<()> {
    let engine = build_engine()?;
    let job_id = job_id_or_generated(job_id);

    let mut source = SimulatedSource::new(&sim_connection("source"));
    if let Some(rows) = rows {
        source = source.with_row_count(rows);
    }
    let target = SimulatedTarget::new(&sim_connection("target"));

    let options = FullLoadOptions {
        chunk_size,
        use_compression: compress,
    };

    let summary = engine
        .full_load(
            &job_id,
            &source,
            &target,
            &table,
            &options,
            &CancellationToken::new(),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Run an incremental load
pub async fn incremental(
    table: String,
    key_column: String,
    target_table: Option<String>,
    batch_size: Option<usize>,
    max_batches: Option<usize>,
    job_id: Option<String>,
    rows: Option<u64>,
) -> Result<()> {
    let engine = build_engine()?;
    let job_id = job_id_or_generated(job_id);

    let mut source = SimulatedSource::new(&sim_connection("source"));
    if let Some(rows) = rows {
        source = source.with_row_count(rows);
    }
    let target = SimulatedTarget::new(&sim_connection("target"));

    let options = IncrementalLoadOptions {
        table_name: table,
        incremental_key_column: key_column,
        target_table_name: target_table,
        batch_size,
        max_batches,
    };

    let summary = engine
        .incremental_load(&job_id, &source, &target, &options, &CancellationToken::new())
        .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

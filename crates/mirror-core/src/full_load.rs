//! Full-load orchestration
//!
//! Extracts an entire table from source to target in primary-key-range
//! chunks, persisting a checkpoint after each chunk is applied so an
//! interrupted run can resume. Chunk processing is strictly sequential;
//! each step depends on the checkpoint of the previous one.

use chrono::Utc;
use mirror_common::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::adapter::{SourceAdapter, TargetAdapter};
use crate::checkpoint::{load_checkpoint, save_checkpoint, CheckpointKey, FullLoadCheckpoint};
use crate::engine::SyncEngine;
use crate::job_store::JobStatusStore;
use crate::types::{JobState, JobUpdate, KeyValue};

/// Options for a full table load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullLoadOptions {
    /// Records per chunk; defaults to the engine configuration
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Ask the target adapter to compress batch payloads in transit
    #[serde(default)]
    pub use_compression: bool,
}

/// Whether the run covered the whole table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullLoadStatus {
    Complete,
    Partial,
}

impl FullLoadStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FullLoadStatus::Complete => "complete",
            FullLoadStatus::Partial => "partial",
        }
    }
}

/// Result summary of a full-load invocation
///
/// `processed_records` aggregates the resume position with this run's
/// work, reported against the source's row estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullLoadSummary {
    pub table: String,
    pub total_records: u64,
    pub processed_records: u64,
    pub status: FullLoadStatus,
}

impl SyncEngine {
    /// Run a full load of `table_name` from `source` into `target`
    ///
    /// Registers the job, drives the chunk loop, and records the outcome
    /// in the job store. Errors propagate to the caller after the job is
    /// marked failed; a re-invocation with the same job id resumes from
    /// the persisted checkpoint.
    pub async fn full_load(
        &self,
        job_id: &str,
        source: &dyn SourceAdapter,
        target: &dyn TargetAdapter,
        table_name: &str,
        options: &FullLoadOptions,
        cancel: &CancellationToken,
    ) -> Result<FullLoadSummary> {
        self.ensure_not_running(job_id)?;
        self.jobs.init_job(job_id);
        self.jobs.update(
            job_id,
            JobUpdate::running(format!("Initializing full load for table {}", table_name))
                .with_progress(0),
        );

        if table_name.is_empty() {
            let msg = "Table name must be provided for full load";
            self.fail_job(job_id, msg);
            return Err(MirrorError::validation(msg));
        }

        info!(
            job_id,
            table = table_name,
            source = source.name(),
            target = target.name(),
            "Executing full load"
        );
        self.jobs.update(
            job_id,
            JobUpdate::running(format!("Starting extraction for table {}", table_name))
                .with_progress(5),
        );

        match self
            .extract_table(job_id, source, target, table_name, options, cancel)
            .await
        {
            Ok(summary) => {
                info!(
                    job_id,
                    table = table_name,
                    processed = summary.processed_records,
                    total = summary.total_records,
                    status = summary.status.as_str(),
                    "Full load finished"
                );
                let mut update = JobUpdate::status(JobState::Completed)
                    .with_message(format!(
                        "Full load for table {} finished. Processed {} of estimated {} records.",
                        table_name, summary.processed_records, summary.total_records
                    ))
                    .with_result(serde_json::to_value(&summary)?);
                if summary.status == FullLoadStatus::Complete {
                    update = update.with_progress(100);
                }
                self.jobs.update(job_id, update);
                Ok(summary)
            },
            Err(e) => {
                error!(job_id, table = table_name, error = %e, "Full load failed");
                self.fail_job(job_id, format!("Full load failed: {}", e));
                Err(e)
            },
        }
    }

    /// Chunked extraction loop for one table
    async fn extract_table(
        &self,
        job_id: &str,
        source: &dyn SourceAdapter,
        target: &dyn TargetAdapter,
        table_name: &str,
        options: &FullLoadOptions,
        cancel: &CancellationToken,
    ) -> Result<FullLoadSummary> {
        let info = source.table_info(table_name).await?;
        debug!(
            job_id,
            table = %info.name,
            primary_key = %info.primary_key,
            estimated_rows = info.estimated_rows,
            "Fetched table info"
        );

        if info.estimated_rows == 0 {
            self.jobs.update(
                job_id,
                JobUpdate::message(format!(
                    "Table {} is empty, no records to extract",
                    table_name
                ))
                .with_progress(100),
            );
            return Ok(FullLoadSummary {
                table: table_name.to_string(),
                total_records: 0,
                processed_records: 0,
                status: FullLoadStatus::Complete,
            });
        }

        let chunk_size = options.chunk_size.unwrap_or(self.config.chunk_size) as u64;
        if chunk_size == 0 {
            return Err(MirrorError::validation("chunk_size must be greater than 0"));
        }
        let total_chunks = info.estimated_rows.div_ceil(chunk_size);
        info!(
            job_id,
            rows = info.estimated_rows,
            total_chunks,
            chunk_size,
            "Processing table in chunks"
        );

        let key = CheckpointKey::full_load(job_id, table_name);
        let checkpoint: Option<FullLoadCheckpoint> = load_checkpoint(
            self.checkpoints.as_ref(),
            &key,
            self.config.on_corrupt_checkpoint,
        )
        .await?;

        let start_position = match checkpoint {
            None => 0,
            Some(cp) => match cp.last_id {
                KeyValue::Integer(n) if n >= 0 => {
                    info!(job_id, last_id = n, "Resuming full load from checkpoint");
                    n as u64
                },
                other => {
                    return Err(MirrorError::validation(format!(
                        "Checkpoint for table {} holds non-numeric primary key {}; \
                         resumable full load requires numeric primary keys",
                        table_name, other
                    )));
                },
            },
        };

        let mut current_id = start_position;
        let mut processed_this_run: u64 = 0;
        let mut chunks_processed: u64 = 0;

        while current_id < info.estimated_rows {
            if cancel.is_cancelled() {
                warn!(
                    job_id,
                    table = table_name,
                    position = current_id,
                    "Cancellation requested, stopping between chunks"
                );
                break;
            }

            let chunk_len = chunk_size.min(info.estimated_rows - current_id);
            let chunk_end = current_id + chunk_len;

            let records = source
                .fetch_range(table_name, &info.primary_key, current_id, chunk_end)
                .await?;
            if (records.len() as u64) < chunk_len {
                warn!(
                    job_id,
                    start = current_id,
                    end = chunk_end,
                    expected = chunk_len,
                    got = records.len(),
                    "Chunk returned fewer records than expected"
                );
            }

            target
                .write_batch(table_name, &records, options.use_compression)
                .await?;

            // Checkpoint only after the chunk is confirmed applied.
            save_checkpoint(
                self.checkpoints.as_ref(),
                &key,
                &FullLoadCheckpoint {
                    last_id: KeyValue::Integer(chunk_end as i64),
                    timestamp: Utc::now(),
                },
            )
            .await?;

            processed_this_run += records.len() as u64;
            chunks_processed += 1;

            // Cap at 99 until the loop terminates; the wrapper reports 100.
            let progress =
                (((chunks_processed as f64 / total_chunks as f64) * 100.0).round() as u64).min(99);
            self.jobs.update(
                job_id,
                JobUpdate::running(format!(
                    "Processed chunk {}/{} for table {} ({} records this run)",
                    chunks_processed, total_chunks, table_name, processed_this_run
                ))
                .with_progress(progress),
            );

            current_id = chunk_end;
        }

        let processed_records = start_position + processed_this_run;
        let status = if processed_records >= info.estimated_rows {
            FullLoadStatus::Complete
        } else {
            FullLoadStatus::Partial
        };

        Ok(FullLoadSummary {
            table: table_name.to_string(),
            total_records: info.estimated_rows,
            processed_records,
            status,
        })
    }
}

//! Incremental-load orchestration
//!
//! Repeatedly pulls records whose key-column value exceeds the persisted
//! high-water mark, upserts them into the target, and advances the mark.
//! Each invocation is bounded by a batch cap; "no new data" is a normal
//! completion, not a failure.

use chrono::Utc;
use mirror_common::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::adapter::{SourceAdapter, TargetAdapter};
use crate::checkpoint::{load_checkpoint, save_checkpoint, CheckpointKey, IncrementalCheckpoint};
use crate::engine::SyncEngine;
use crate::job_store::JobStatusStore;
use crate::types::{record_key_value, JobState, JobUpdate, KeyValue};

/// Options for an incremental load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalLoadOptions {
    /// Source table to pull changes from
    pub table_name: String,
    /// Monotonic key column driving the high-water mark (e.g. `updated_at`)
    pub incremental_key_column: String,
    /// Target table, when different from the source table
    #[serde(default)]
    pub target_table_name: Option<String>,
    /// Records per batch; defaults to the engine configuration
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Batch cap per invocation; defaults to the engine configuration
    #[serde(default)]
    pub max_batches: Option<usize>,
}

/// Whether an invocation found anything to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementalOutcome {
    ProcessedData,
    NoNewData,
}

/// Result summary of an incremental-load invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalSummary {
    pub job_id: String,
    pub source_table: String,
    pub target_table: String,
    pub incremental_key: String,
    pub processed_records: u64,
    /// Watermark persisted at the end of the run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_value: Option<KeyValue>,
    pub outcome: IncrementalOutcome,
}

impl SyncEngine {
    /// Run one incremental pull from `source` into `target`
    ///
    /// Resumes from the persisted high-water mark; a first run with no
    /// checkpoint starts from the earliest available record. Failures
    /// leave the checkpoint at the last known-good value, so the next
    /// invocation re-fetches at most one batch.
    pub async fn incremental_load(
        &self,
        job_id: &str,
        source: &dyn SourceAdapter,
        target: &dyn TargetAdapter,
        options: &IncrementalLoadOptions,
        cancel: &CancellationToken,
    ) -> Result<IncrementalSummary> {
        self.ensure_not_running(job_id)?;
        self.jobs.init_job(job_id);
        self.jobs.update(
            job_id,
            JobUpdate::running(format!(
                "Initializing incremental load for table {}, key {}",
                options.table_name, options.incremental_key_column
            ))
            .with_progress(0),
        );

        if options.table_name.is_empty() || options.incremental_key_column.is_empty() {
            let msg =
                "table_name and incremental_key_column must be provided for incremental load";
            self.fail_job(job_id, msg);
            return Err(MirrorError::validation(msg));
        }

        info!(
            job_id,
            table = %options.table_name,
            key_column = %options.incremental_key_column,
            source = source.name(),
            target = target.name(),
            "Executing incremental load"
        );

        match self.pull_changes(job_id, source, target, options, cancel).await {
            Ok(summary) => {
                info!(
                    job_id,
                    table = %summary.source_table,
                    processed = summary.processed_records,
                    last_value = ?summary.last_value,
                    "Incremental load finished"
                );
                self.jobs.update(
                    job_id,
                    JobUpdate::status(JobState::Completed)
                        .with_message(format!(
                            "Incremental load for table {} (key: {}) processed {} records this run",
                            summary.source_table,
                            summary.incremental_key,
                            summary.processed_records
                        ))
                        .with_progress(summary.processed_records)
                        .with_result(serde_json::to_value(&summary)?),
                );
                Ok(summary)
            },
            Err(e) => {
                error!(job_id, table = %options.table_name, error = %e, "Incremental load failed");
                self.fail_job(job_id, format!("Incremental load failed: {}", e));
                Err(e)
            },
        }
    }

    /// Batch loop advancing the high-water mark
    async fn pull_changes(
        &self,
        job_id: &str,
        source: &dyn SourceAdapter,
        target: &dyn TargetAdapter,
        options: &IncrementalLoadOptions,
        cancel: &CancellationToken,
    ) -> Result<IncrementalSummary> {
        let target_table = options
            .target_table_name
            .clone()
            .unwrap_or_else(|| options.table_name.clone());
        let batch_size = options.batch_size.unwrap_or(self.config.batch_size);
        if batch_size == 0 {
            return Err(MirrorError::validation("batch_size must be greater than 0"));
        }
        let max_batches = options.max_batches.unwrap_or(self.config.max_batches_per_run);

        let key = CheckpointKey::incremental(
            job_id,
            source.name(),
            &options.table_name,
            target.name(),
            &target_table,
            &options.incremental_key_column,
        );
        let checkpoint: Option<IncrementalCheckpoint> = load_checkpoint(
            self.checkpoints.as_ref(),
            &key,
            self.config.on_corrupt_checkpoint,
        )
        .await?;

        let mut watermark = checkpoint.map(|cp| cp.last_value);
        match &watermark {
            None => {
                info!(job_id, table = %options.table_name, "No checkpoint, starting from the earliest available record");
                self.jobs.update(
                    job_id,
                    JobUpdate::message(format!(
                        "No checkpoint for {}, key {}; starting from the earliest available record",
                        options.table_name, options.incremental_key_column
                    )),
                );
            },
            Some(value) => {
                info!(job_id, table = %options.table_name, last_value = %value, "Resuming from checkpoint");
                self.jobs.update(
                    job_id,
                    JobUpdate::message(format!(
                        "Resuming incremental load for {} from last value {}",
                        options.table_name, value
                    )),
                );
            },
        }

        let mut processed: u64 = 0;

        for batch_index in 0..max_batches {
            if cancel.is_cancelled() {
                warn!(
                    job_id,
                    table = %options.table_name,
                    "Cancellation requested, stopping between batches"
                );
                break;
            }

            let since_label = watermark
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "start".to_string());
            self.jobs.update(
                job_id,
                JobUpdate::running(format!(
                    "Fetching batch for {}, key > {}",
                    options.table_name, since_label
                ))
                .with_progress(processed),
            );

            let batch = source
                .fetch_since(
                    &options.table_name,
                    &options.incremental_key_column,
                    watermark.as_ref(),
                    batch_size,
                )
                .await?;

            if batch.is_empty() {
                debug!(job_id, table = %options.table_name, "No new data, caught up");
                self.jobs.update(
                    job_id,
                    JobUpdate::message(format!(
                        "No new data for {}; {} records processed this run",
                        options.table_name, processed
                    )),
                );
                break;
            }

            // Batches are ordered ascending, so the last record carries the max.
            let last_record = &batch[batch.len() - 1];
            let batch_max = record_key_value(last_record, &options.incremental_key_column)
                .ok_or_else(|| {
                    MirrorError::consistency(format!(
                        "Incremental key column '{}' missing or null in fetched record",
                        options.incremental_key_column
                    ))
                })?;

            if let Some(prev) = &watermark {
                if batch_max.partial_cmp(prev) != Some(Ordering::Greater) {
                    // Persist the unchanged watermark (refreshed timestamp)
                    // rather than regressing it or looping forever.
                    save_checkpoint(
                        self.checkpoints.as_ref(),
                        &key,
                        &IncrementalCheckpoint {
                            last_value: prev.clone(),
                            last_sync_timestamp: Utc::now(),
                        },
                    )
                    .await?;
                    return Err(MirrorError::consistency(format!(
                        "Batch max key {} for table {} does not advance past previous watermark {}",
                        batch_max, options.table_name, prev
                    )));
                }
            }

            let upsert_key = if batch[0].contains_key("id") {
                "id"
            } else {
                options.incremental_key_column.as_str()
            };
            target.upsert_batch(&target_table, upsert_key, &batch).await?;

            processed += batch.len() as u64;

            save_checkpoint(
                self.checkpoints.as_ref(),
                &key,
                &IncrementalCheckpoint {
                    last_value: batch_max.clone(),
                    last_sync_timestamp: Utc::now(),
                },
            )
            .await?;

            self.jobs.update(
                job_id,
                JobUpdate::running(format!(
                    "Processed batch of {} for {}. New max key: {}. Total this run: {}",
                    batch.len(),
                    options.table_name,
                    batch_max,
                    processed
                ))
                .with_progress(processed),
            );

            watermark = Some(batch_max);

            if batch_index + 1 == max_batches {
                warn!(
                    job_id,
                    table = %options.table_name,
                    max_batches,
                    "Reached batch cap for this invocation"
                );
            }
        }

        let outcome = if processed > 0 {
            IncrementalOutcome::ProcessedData
        } else {
            IncrementalOutcome::NoNewData
        };

        Ok(IncrementalSummary {
            job_id: job_id.to_string(),
            source_table: options.table_name.clone(),
            target_table,
            incremental_key: options.incremental_key_column.clone(),
            processed_records: processed,
            last_value: watermark,
            outcome,
        })
    }
}

//! Scripted adapters shared by the orchestrator integration tests

use async_trait::async_trait;
use mirror_common::{MirrorError, Result};
use mirror_core::{
    JobStore, KeyValue, MemoryCheckpointStore, Record, SourceAdapter, SyncConfig, SyncEngine,
    TableInfo, TargetAdapter,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Build an engine over a memory checkpoint store, returning the store
/// handle for inspection
pub fn engine_with_memory_store(config: SyncConfig) -> (SyncEngine, Arc<MemoryCheckpointStore>) {
    let checkpoints = Arc::new(MemoryCheckpointStore::new());
    let engine = SyncEngine::new(Arc::new(JobStore::new()), checkpoints.clone(), config);
    (engine, checkpoints)
}

/// A record with an integer key column (plus `id` unless suppressed)
pub fn keyed_record(key_column: &str, key: i64, with_id: bool) -> Record {
    let mut record = Record::new();
    record.insert(key_column.to_string(), json!(key));
    if with_id && key_column != "id" {
        record.insert("id".to_string(), json!(key));
    }
    record.insert("name".to_string(), json!(format!("Record {}", key)));
    record
}

/// Numeric-primary-key source backed by a row estimate; generates dense
/// ids for any requested range and records the ranges it was asked for
pub struct RangeSource {
    estimated_rows: u64,
    fetch_calls: Mutex<Vec<(u64, u64)>>,
}

impl RangeSource {
    pub fn new(estimated_rows: u64) -> Self {
        Self {
            estimated_rows,
            fetch_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fetch_calls(&self) -> Vec<(u64, u64)> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceAdapter for RangeSource {
    fn name(&self) -> &str {
        "scripted-source"
    }

    async fn table_info(&self, table: &str) -> Result<TableInfo> {
        Ok(TableInfo {
            name: table.to_string(),
            primary_key: "id".to_string(),
            estimated_rows: self.estimated_rows,
            columns: vec!["id".to_string(), "name".to_string()],
        })
    }

    async fn fetch_range(
        &self,
        _table: &str,
        _primary_key: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<Record>> {
        self.fetch_calls.lock().unwrap().push((start, end));
        Ok((start..end)
            .map(|id| keyed_record("id", id as i64, false))
            .collect())
    }

    async fn fetch_since(
        &self,
        _table: &str,
        _key_column: &str,
        _since: Option<&KeyValue>,
        _limit: usize,
    ) -> Result<Vec<Record>> {
        Err(MirrorError::adapter("RangeSource does not serve incremental fetches"))
    }
}

/// Incremental source that replays a scripted sequence of batches and
/// records the watermark passed to each fetch
pub struct SeqSource {
    batches: Mutex<VecDeque<Vec<Record>>>,
    since_calls: Mutex<Vec<Option<KeyValue>>>,
}

impl SeqSource {
    pub fn new(batches: Vec<Vec<Record>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            since_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn since_calls(&self) -> Vec<Option<KeyValue>> {
        self.since_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceAdapter for SeqSource {
    fn name(&self) -> &str {
        "scripted-source"
    }

    async fn table_info(&self, table: &str) -> Result<TableInfo> {
        Ok(TableInfo {
            name: table.to_string(),
            primary_key: "id".to_string(),
            estimated_rows: 0,
            columns: vec!["id".to_string()],
        })
    }

    async fn fetch_range(
        &self,
        _table: &str,
        _primary_key: &str,
        _start: u64,
        _end: u64,
    ) -> Result<Vec<Record>> {
        Err(MirrorError::adapter("SeqSource does not serve range fetches"))
    }

    async fn fetch_since(
        &self,
        _table: &str,
        _key_column: &str,
        since: Option<&KeyValue>,
        _limit: usize,
    ) -> Result<Vec<Record>> {
        self.since_calls.lock().unwrap().push(since.cloned());
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Target that records batch sizes and upsert keys; can fail on the nth
/// write or trigger cancellation after a write
#[derive(Default)]
pub struct CollectingTarget {
    written: Mutex<Vec<usize>>,
    upserted: Mutex<Vec<usize>>,
    upsert_keys: Mutex<Vec<String>>,
    fail_on_write: Option<usize>,
    cancel_after_write: Option<(usize, CancellationToken)>,
}

impl CollectingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the nth `write_batch` call (1-based)
    pub fn fail_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }

    /// Cancel the token after the nth successful `write_batch` (1-based)
    pub fn cancel_after_write(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after_write = Some((n, token));
        self
    }

    pub fn written(&self) -> Vec<usize> {
        self.written.lock().unwrap().clone()
    }

    pub fn upserted(&self) -> Vec<usize> {
        self.upserted.lock().unwrap().clone()
    }

    pub fn upsert_keys(&self) -> Vec<String> {
        self.upsert_keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl TargetAdapter for CollectingTarget {
    fn name(&self) -> &str {
        "scripted-target"
    }

    async fn write_batch(&self, _table: &str, records: &[Record], _compress: bool) -> Result<()> {
        let mut written = self.written.lock().unwrap();
        let call_number = written.len() + 1;

        if self.fail_on_write == Some(call_number) {
            return Err(MirrorError::adapter("simulated write failure"));
        }

        written.push(records.len());

        if let Some((n, token)) = &self.cancel_after_write {
            if *n == call_number {
                token.cancel();
            }
        }
        Ok(())
    }

    async fn upsert_batch(&self, _table: &str, key_column: &str, records: &[Record]) -> Result<()> {
        self.upserted.lock().unwrap().push(records.len());
        self.upsert_keys.lock().unwrap().push(key_column.to_string());
        Ok(())
    }
}

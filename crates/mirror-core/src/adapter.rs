//! Source and target adapter contracts
//!
//! Adapters are the pluggable I/O seam of the engine: one implementation
//! per system type (database, file, API). The orchestrators only see
//! these traits; connection details stay inside the adapter.

use async_trait::async_trait;
use mirror_common::Result;

use crate::types::{KeyValue, Record, TableInfo};

/// Read side of a load
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display name used in logs and checkpoint identities
    fn name(&self) -> &str;

    /// Fetch table metadata once per load; treated as a snapshot
    async fn table_info(&self, table: &str) -> Result<TableInfo>;

    /// Fetch records with primary key in `[start, end)`, ordered by the
    /// primary key (full load)
    async fn fetch_range(
        &self,
        table: &str,
        primary_key: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<Record>>;

    /// Fetch up to `limit` records whose `key_column` value exceeds
    /// `since`, ascending by `key_column` (incremental load)
    ///
    /// `since = None` means "from the earliest available record". This is
    /// part of the contract: adapters must not invent their own baseline
    /// for the first run.
    async fn fetch_since(
        &self,
        table: &str,
        key_column: &str,
        since: Option<&KeyValue>,
        limit: usize,
    ) -> Result<Vec<Record>>;
}

/// Write side of a load
#[async_trait]
pub trait TargetAdapter: Send + Sync {
    /// Display name used in logs and checkpoint identities
    fn name(&self) -> &str;

    /// Insert a batch (full load). The target is assumed empty or
    /// duplicate-tolerant; no deduplication happens here. When
    /// `compress` is set the adapter may compress the payload in
    /// transit; the codec is the adapter's concern.
    async fn write_batch(&self, table: &str, records: &[Record], compress: bool) -> Result<()>;

    /// Upsert a batch keyed by `key_column` (incremental load)
    ///
    /// Must be idempotent: under at-least-once delivery the same records
    /// can be re-applied after a crash between write and checkpoint.
    async fn upsert_batch(&self, table: &str, key_column: &str, records: &[Record]) -> Result<()>;
}

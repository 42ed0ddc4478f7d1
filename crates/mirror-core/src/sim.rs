//! Simulated adapters
//!
//! Deterministic stand-ins for real source/target connectivity, used by
//! the CLI, the server demo surface, and tests. A simulated source
//! exposes a finite keyspace `1..=estimated_rows` so incremental runs
//! eventually catch up; a simulated target counts what it would have
//! written.

use async_trait::async_trait;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use mirror_common::{MirrorError, Result};
use serde_json::json;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::adapter::{SourceAdapter, TargetAdapter};
use crate::types::{ConnectionConfig, KeyValue, Record, TableInfo};

/// Deterministic record generator parameterized by a connection config
#[derive(Debug)]
pub struct SimulatedSource {
    name: String,
    primary_key: String,
    estimated_rows: u64,
    columns: Vec<String>,
}

impl SimulatedSource {
    /// Build a source profile from the connection type, mirroring what a
    /// metadata probe against the real system would report
    pub fn new(config: &ConnectionConfig) -> Self {
        let (primary_key, estimated_rows, columns) = match config {
            ConnectionConfig::Relational { .. } => (
                "id",
                1_000_000,
                vec!["id", "name", "created_at", "updated_at", "value1", "value2"],
            ),
            ConnectionConfig::File { .. } => (
                "line_number",
                10_000,
                vec!["line_number", "col1", "col2", "col3"],
            ),
            ConnectionConfig::Api { .. } => {
                ("id", 50_000, vec!["id", "field_a", "field_b", "timestamp"])
            },
        };

        Self {
            name: config.display_name().to_string(),
            primary_key: primary_key.to_string(),
            estimated_rows,
            columns: columns.into_iter().map(String::from).collect(),
        }
    }

    /// Override the estimated row count (handy for demos and tests)
    pub fn with_row_count(mut self, rows: u64) -> Self {
        self.estimated_rows = rows;
        self
    }

    fn make_record(&self, key_column: &str, key: i64) -> Record {
        let now = Utc::now().to_rfc3339();
        let mut record = Record::new();
        record.insert(key_column.to_string(), json!(key));
        if key_column != "id" {
            record.insert("id".to_string(), json!(key));
        }
        record.insert("name".to_string(), json!(format!("Record {}", key)));
        record.insert("updated_at".to_string(), json!(now));
        record.insert("value1".to_string(), json!((key * 37) % 1000));
        record
    }
}

#[async_trait]
impl SourceAdapter for SimulatedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn table_info(&self, table: &str) -> Result<TableInfo> {
        debug!(source = %self.name, table, "Simulating table metadata fetch");
        Ok(TableInfo {
            name: table.to_string(),
            primary_key: self.primary_key.clone(),
            estimated_rows: self.estimated_rows,
            columns: self.columns.clone(),
        })
    }

    async fn fetch_range(
        &self,
        table: &str,
        primary_key: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<Record>> {
        debug!(
            source = %self.name,
            table,
            primary_key,
            start,
            end,
            "Simulating range fetch"
        );
        Ok((start..end)
            .map(|id| self.make_record(primary_key, id as i64))
            .collect())
    }

    async fn fetch_since(
        &self,
        table: &str,
        key_column: &str,
        since: Option<&KeyValue>,
        limit: usize,
    ) -> Result<Vec<Record>> {
        let base = match since {
            None => 0,
            Some(KeyValue::Integer(n)) => *n,
            Some(other) => {
                return Err(MirrorError::adapter(format!(
                    "Simulated source {} uses integer keys, got watermark {}",
                    self.name, other
                )))
            },
        };

        debug!(
            source = %self.name,
            table,
            key_column,
            since = base,
            limit,
            "Simulating incremental fetch"
        );

        let first = base.saturating_add(1);
        let last = (base.saturating_add(limit as i64)).min(self.estimated_rows as i64);
        if first > last {
            return Ok(Vec::new());
        }

        Ok((first..=last)
            .map(|key| self.make_record(key_column, key))
            .collect())
    }
}

/// Write sink that counts records instead of persisting them
#[derive(Debug)]
pub struct SimulatedTarget {
    name: String,
    inserted: AtomicU64,
    upserted: AtomicU64,
}

impl SimulatedTarget {
    pub fn new(config: &ConnectionConfig) -> Self {
        Self {
            name: config.display_name().to_string(),
            inserted: AtomicU64::new(0),
            upserted: AtomicU64::new(0),
        }
    }

    /// Records inserted via `write_batch` so far
    pub fn inserted(&self) -> u64 {
        self.inserted.load(Ordering::Relaxed)
    }

    /// Records upserted via `upsert_batch` so far
    pub fn upserted(&self) -> u64 {
        self.upserted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TargetAdapter for SimulatedTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write_batch(&self, table: &str, records: &[Record], compress: bool) -> Result<()> {
        if records.is_empty() {
            debug!(target = %self.name, table, "Skipping empty insert batch");
            return Ok(());
        }

        if compress {
            let payload = serde_json::to_vec(records)?;
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&payload)?;
            let compressed = encoder.finish()?;
            debug!(
                target = %self.name,
                table,
                raw_bytes = payload.len(),
                compressed_bytes = compressed.len(),
                "Compressed batch payload"
            );
        }

        info!(
            target = %self.name,
            table,
            records = records.len(),
            "Simulating batch insert"
        );
        self.inserted.fetch_add(records.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    async fn upsert_batch(&self, table: &str, key_column: &str, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            debug!(target = %self.name, table, "Skipping empty upsert batch");
            return Ok(());
        }

        info!(
            target = %self.name,
            table,
            key_column,
            records = records.len(),
            "Simulating batch upsert"
        );
        self.upserted.fetch_add(records.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relational(name: &str) -> ConnectionConfig {
        ConnectionConfig::Relational {
            host: "sim.internal".to_string(),
            port: Some(5432),
            user: None,
            password: None,
            database: Some("sim".to_string()),
            name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn test_table_info_profile_by_type() {
        let source = SimulatedSource::new(&relational("src"));
        let info = source.table_info("customers").await.unwrap();
        assert_eq!(info.name, "customers");
        assert_eq!(info.primary_key, "id");
        assert_eq!(info.estimated_rows, 1_000_000);

        let file_source = SimulatedSource::new(&ConnectionConfig::File {
            path: "/data/in.csv".to_string(),
            format: "csv".to_string(),
            name: None,
        });
        let info = file_source.table_info("in").await.unwrap();
        assert_eq!(info.primary_key, "line_number");
        assert_eq!(info.estimated_rows, 10_000);
    }

    #[tokio::test]
    async fn test_fetch_range_is_deterministic() {
        let source = SimulatedSource::new(&relational("src"));
        let records = source.fetch_range("customers", "id", 100, 110).await.unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].get("id"), Some(&json!(100)));
        assert_eq!(records[9].get("id"), Some(&json!(109)));
    }

    #[tokio::test]
    async fn test_fetch_since_pages_and_catches_up() {
        let source = SimulatedSource::new(&relational("src")).with_row_count(7);

        let first = source.fetch_since("t", "id", None, 5).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[4].get("id"), Some(&json!(5)));

        let watermark = KeyValue::Integer(5);
        let second = source.fetch_since("t", "id", Some(&watermark), 5).await.unwrap();
        assert_eq!(second.len(), 2);

        let caught_up = KeyValue::Integer(7);
        let third = source.fetch_since("t", "id", Some(&caught_up), 5).await.unwrap();
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_since_rejects_foreign_watermark() {
        let source = SimulatedSource::new(&relational("src"));
        let watermark = KeyValue::Text("abc".to_string());
        let result = source.fetch_since("t", "id", Some(&watermark), 5).await;
        assert!(matches!(result, Err(MirrorError::Adapter(_))));
    }

    #[tokio::test]
    async fn test_target_counts_writes() {
        let target = SimulatedTarget::new(&relational("tgt"));
        let records: Vec<Record> = (0..3)
            .map(|i| {
                let mut r = Record::new();
                r.insert("id".to_string(), json!(i));
                r
            })
            .collect();

        target.write_batch("t", &records, false).await.unwrap();
        target.write_batch("t", &records, true).await.unwrap();
        target.upsert_batch("t", "id", &records).await.unwrap();

        assert_eq!(target.inserted(), 6);
        assert_eq!(target.upserted(), 3);
    }
}

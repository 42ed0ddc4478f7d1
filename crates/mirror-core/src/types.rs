//! Core types for the sync engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single record pulled from a source adapter, as a JSON object
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Whether this is a terminal state (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job record tracked by the job store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobState,
    /// Percent (0-100) for full loads, cumulative record count for incremental
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Opaque result payload from the load routine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update merged into a job record
///
/// Only the populated fields are applied; `updated_at` is always refreshed.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobState>,
    pub progress: Option<u64>,
    pub message: Option<String>,
    pub result: Option<serde_json::Value>,
}

impl JobUpdate {
    /// Update carrying only a status change
    pub fn status(status: JobState) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Update marking the job running with a message
    pub fn running(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobState::Running),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Update carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: JobState) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_progress(mut self, progress: u64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }
}

/// Typed watermark value for checkpoints and incremental keys
///
/// Ordering is only defined within the same variant; comparing across
/// variants yields `None`, which the orchestrators treat as a consistency
/// error instead of guessing at coercion semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Integer(i64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl KeyValue {
    /// Interpret a JSON value as a key value
    ///
    /// Integral numbers map to `Integer`, RFC 3339 strings to `Timestamp`,
    /// other strings to `Text`. Floats, booleans, nulls, and structured
    /// values are not usable as keys.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(KeyValue::Integer),
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(s) {
                Ok(ts) => Some(KeyValue::Timestamp(ts.with_timezone(&Utc))),
                Err(_) => Some(KeyValue::Text(s.clone())),
            },
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            KeyValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (KeyValue::Integer(a), KeyValue::Integer(b)) => a.partial_cmp(b),
            (KeyValue::Timestamp(a), KeyValue::Timestamp(b)) => a.partial_cmp(b),
            (KeyValue::Text(a), KeyValue::Text(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyValue::Integer(n) => write!(f, "{}", n),
            KeyValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            KeyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(n: i64) -> Self {
        KeyValue::Integer(n)
    }
}

/// Extract the key value of `column` from a record
pub fn record_key_value(record: &Record, column: &str) -> Option<KeyValue> {
    record.get(column).and_then(KeyValue::from_json)
}

/// Source table metadata, fetched once per load and treated as a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub primary_key: String,
    pub estimated_rows: u64,
    pub columns: Vec<String>,
}

/// Connection descriptor used to select and parameterize adapters
///
/// Never persisted by the core; credentials stay with the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionConfig {
    Relational {
        host: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    File {
        path: String,
        format: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Api {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        auth_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl ConnectionConfig {
    /// The endpoint this config points at (host, path, or URL)
    pub fn endpoint(&self) -> &str {
        match self {
            ConnectionConfig::Relational { host, .. } => host,
            ConnectionConfig::File { path, .. } => path,
            ConnectionConfig::Api { url, .. } => url,
        }
    }

    /// Display name for logs and checkpoint identities
    pub fn display_name(&self) -> &str {
        let name = match self {
            ConnectionConfig::Relational { name, .. } => name,
            ConnectionConfig::File { name, .. } => name,
            ConnectionConfig::Api { name, .. } => name,
        };
        name.as_deref().unwrap_or_else(|| self.endpoint())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConnectionConfig::Relational { .. } => "relational",
            ConnectionConfig::File { .. } => "file",
            ConnectionConfig::Api { .. } => "api",
        }
    }
}

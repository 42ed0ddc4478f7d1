//! In-memory job status registry
//!
//! Single source of truth for job lifecycle state, visible to
//! status-polling callers. Safe for concurrent access from cooperative
//! tasks; writes are serialized by an internal lock. Records accumulate
//! for the process lifetime and are only reclaimed by restart.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::warn;

use crate::types::{JobRecord, JobState, JobUpdate};

/// Interface over job lifecycle storage
///
/// The engine only depends on this trait, so the in-memory registry can
/// be swapped for a shared external store (keyed persistent store with
/// atomic upsert) without touching orchestrator logic.
pub trait JobStatusStore: Send + Sync {
    /// Create a pending record for `job_id`
    ///
    /// Re-initializing an existing id overwrites the record and logs a
    /// warning; callers must keep ids unique to avoid clobbering an
    /// in-flight job's history.
    fn init_job(&self, job_id: &str);

    /// Merge a partial update into the record for `job_id`
    ///
    /// `updated_at` is always refreshed. If no record exists one is
    /// synthesized (status defaults to running); that path masks
    /// ordering bugs, so callers should `init_job` first.
    fn update(&self, job_id: &str, update: JobUpdate);

    /// Fetch the record for `job_id`, if any
    fn get(&self, job_id: &str) -> Option<JobRecord>;

    /// All job records, most recently updated first
    fn list(&self) -> Vec<JobRecord>;
}

/// In-memory registry of job records keyed by job id
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStatusStore for JobStore {
    fn init_job(&self, job_id: &str) {
        let mut jobs = self.jobs.write().unwrap_or_else(std::sync::PoisonError::into_inner);

        if jobs.contains_key(job_id) {
            warn!(job_id, "Job already existed, re-initializing");
        }

        let now = Utc::now();
        jobs.insert(
            job_id.to_string(),
            JobRecord {
                job_id: job_id.to_string(),
                status: JobState::Pending,
                progress: None,
                message: Some("Job initialized".to_string()),
                result: None,
                started_at: now,
                updated_at: now,
            },
        );
    }

    fn update(&self, job_id: &str, update: JobUpdate) {
        let mut jobs = self.jobs.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Utc::now();

        match jobs.get_mut(job_id) {
            Some(job) => {
                if let Some(status) = update.status {
                    job.status = status;
                }
                if let Some(progress) = update.progress {
                    job.progress = Some(progress);
                }
                if let Some(message) = update.message {
                    job.message = Some(message);
                }
                if let Some(result) = update.result {
                    job.result = Some(result);
                }
                job.updated_at = now;
            },
            None => {
                warn!(job_id, "Job not found for update, initializing from update");
                jobs.insert(
                    job_id.to_string(),
                    JobRecord {
                        job_id: job_id.to_string(),
                        status: update.status.unwrap_or(JobState::Running),
                        progress: update.progress,
                        message: update.message,
                        result: update.result,
                        started_at: now,
                        updated_at: now,
                    },
                );
            },
        }
    }

    fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(job_id)
            .cloned()
    }

    fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self
            .jobs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_init_job_creates_pending_record() {
        let store = JobStore::new();
        store.init_job("job-1");

        let job = store.get("job-1").unwrap();
        assert_eq!(job.status, JobState::Pending);
        assert_eq!(job.message.as_deref(), Some("Job initialized"));
        assert!(job.progress.is_none());
    }

    #[test]
    fn test_reinit_overwrites_without_error() {
        let store = JobStore::new();
        store.init_job("job-1");
        store.update("job-1", JobUpdate::status(JobState::Failed).with_progress(40));

        store.init_job("job-1");

        let job = store.get("job-1").unwrap();
        assert_eq!(job.status, JobState::Pending);
        assert!(job.progress.is_none());
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let store = JobStore::new();
        store.init_job("job-1");
        store.update(
            "job-1",
            JobUpdate::running("processing").with_progress(50),
        );
        store.update("job-1", JobUpdate::message("still processing"));

        let job = store.get("job-1").unwrap();
        assert_eq!(job.status, JobState::Running);
        assert_eq!(job.progress, Some(50));
        assert_eq!(job.message.as_deref(), Some("still processing"));
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let store = JobStore::new();
        store.init_job("job-1");
        let before = store.get("job-1").unwrap().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        store.update("job-1", JobUpdate::message("tick"));

        let job = store.get("job-1").unwrap();
        assert!(job.updated_at > before);
        assert!(job.started_at <= job.updated_at);
    }

    #[test]
    fn test_update_synthesizes_missing_record() {
        let store = JobStore::new();
        store.update("ghost", JobUpdate::message("late update").with_progress(10));

        let job = store.get("ghost").unwrap();
        assert_eq!(job.status, JobState::Running);
        assert_eq!(job.progress, Some(10));
    }

    #[test]
    fn test_get_unknown_job() {
        let store = JobStore::new();
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn test_list_sorted_by_recency() {
        let store = JobStore::new();
        store.init_job("older");
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.init_job("newer");
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.update("older", JobUpdate::message("touched").with_result(json!({})));

        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].job_id, "older");
        assert_eq!(listed[1].job_id, "newer");
    }
}

//! Sync engine
//!
//! Owns the shared job store and checkpoint store and exposes the two
//! load orchestrators (`full_load`, `incremental_load`) plus the
//! status-polling surface. Each job id must only ever be driven by one
//! orchestrator invocation at a time; a second invocation for a running
//! job is rejected.

use std::sync::Arc;

use mirror_common::{MirrorError, Result};

use crate::checkpoint::CheckpointStore;
use crate::config::SyncConfig;
use crate::job_store::JobStatusStore;
use crate::types::{JobRecord, JobState, JobUpdate};

/// Orchestration engine for full and incremental loads
pub struct SyncEngine {
    pub(crate) jobs: Arc<dyn JobStatusStore>,
    pub(crate) checkpoints: Arc<dyn CheckpointStore>,
    pub(crate) config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        jobs: Arc<dyn JobStatusStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            jobs,
            checkpoints,
            config,
        }
    }

    /// The shared job store
    pub fn job_store(&self) -> &Arc<dyn JobStatusStore> {
        &self.jobs
    }

    /// Status of a single job, if known
    pub fn job_status(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs.get(job_id)
    }

    /// All job records, most recently updated first
    pub fn list_jobs(&self) -> Vec<JobRecord> {
        self.jobs.list()
    }

    /// Reject a start request for a job id that is currently running
    pub(crate) fn ensure_not_running(&self, job_id: &str) -> Result<()> {
        match self.jobs.get(job_id) {
            Some(job) if job.status == JobState::Running => {
                Err(MirrorError::JobAlreadyRunning(job_id.to_string()))
            },
            _ => Ok(()),
        }
    }

    /// Mark a job failed with a descriptive message
    pub(crate) fn fail_job(&self, job_id: &str, message: impl Into<String>) {
        self.jobs
            .update(job_id, JobUpdate::status(JobState::Failed).with_message(message));
    }
}

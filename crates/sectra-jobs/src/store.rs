//! In-memory job store.
//!
//! The store is the only resource shared across concurrent job executions.
//! Writes follow a single-writer rule (only the task owning a job mutates
//! its record); reads return an atomic snapshot so any number of status
//! pollers can read a record mid-update.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use sectra_core::{AnalysisJob, JobStatus, JobStore, Result};

/// In-memory `JobStore` backed by a `HashMap` under an async lock.
#[derive(Clone, Default)]
pub struct MemoryJobStore {
    jobs: Arc<RwLock<HashMap<Uuid, AnalysisJob>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held (test/diagnostic aid).
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    /// Idempotent overwrite of the latest state for the job's id.
    async fn save(&self, job: &AnalysisJob) -> Result<()> {
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(())
    }

    /// Compare-and-swap under the write lock: the status check and the
    /// overwrite are one atomic step. A missing record counts as a failed
    /// comparison.
    async fn save_if_status(&self, job: &AnalysisJob, expected: JobStatus) -> Result<bool> {
        let mut jobs = self.jobs.write().await;
        match jobs.get(&job.id) {
            Some(current) if current.status == expected => {
                jobs.insert(job.id, job.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AnalysisJob>> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }
}

//! Batch result module.
//!
//! A derived view over the registry for the jobs of one batch. Nothing is
//! stored besides the batch's ids; every query reads the live registry, so a
//! job removed after the batch started simply drops out of every view.

use crate::job::{Job, JobId, JobStatus};
use crate::registry::JobRegistry;
use serde::{Deserialize, Serialize};

/// Per-status counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub pending: usize,
    pub converting: usize,
    pub converted: usize,
    pub failed: usize,
}

/// View over the jobs captured when a batch started.
#[derive(Debug, Clone)]
pub struct BatchResult {
    registry: JobRegistry,
    ids: Vec<JobId>,
}

impl BatchResult {
    pub(crate) fn new(registry: JobRegistry, ids: Vec<JobId>) -> Self {
        Self { registry, ids }
    }

    /// Ids captured at batch start, in registration order.
    pub fn ids(&self) -> &[JobId] {
        &self.ids
    }

    /// Live jobs of the batch, in registration order.
    pub fn jobs(&self) -> Vec<Job> {
        self.registry.jobs_for(&self.ids)
    }

    /// True iff every live job of the batch is converted or failed.
    pub fn is_complete(&self) -> bool {
        self.jobs().iter().all(Job::is_terminal)
    }

    /// Jobs eligible for download: converted ones, in registration order.
    pub fn downloadable(&self) -> Vec<Job> {
        self.with_status(JobStatus::Converted)
    }

    pub fn failed(&self) -> Vec<Job> {
        self.with_status(JobStatus::Failed)
    }

    pub fn has_any_failure(&self) -> bool {
        self.jobs().iter().any(|job| job.status() == JobStatus::Failed)
    }

    pub fn summary(&self) -> BatchSummary {
        let jobs = self.jobs();
        let mut summary = BatchSummary {
            total: jobs.len(),
            ..BatchSummary::default()
        };
        for job in &jobs {
            match job.status() {
                JobStatus::Pending => summary.pending += 1,
                JobStatus::Converting => summary.converting += 1,
                JobStatus::Converted => summary.converted += 1,
                JobStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    fn with_status(&self, status: JobStatus) -> Vec<Job> {
        self.jobs()
            .into_iter()
            .filter(|job| job.status() == status)
            .collect()
    }
}

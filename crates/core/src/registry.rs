//! Job registry module.
//!
//! In-memory collection of jobs keyed by `JobId`, kept in registration order.
//! The registry is the single mutable structure shared between the caller and
//! the orchestrator: every operation takes the lock exactly once, so readers
//! never observe a job mid-update.

use crate::batch::BatchResult;
use crate::catalog::{FormatCatalog, MediaCategory};
use crate::engine::{ConversionRequest, ConvertedFile, EngineError};
use crate::error::BatchError;
use crate::job::{ErrorInfo, Job, JobId, JobState, JobStatus, OutputRef, UploadedFile};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    /// Registration order
    order: Vec<JobId>,
    jobs: HashMap<JobId, Job>,
}

impl Inner {
    fn ordered(&self) -> impl Iterator<Item = &Job> {
        self.order.iter().filter_map(|id| self.jobs.get(id))
    }

    fn is_ready(&self) -> bool {
        !self.jobs.is_empty() && self.jobs.values().all(|job| job.target_extension().is_some())
    }
}

/// Result of trying to move a job into `Converting`.
#[derive(Debug)]
pub(crate) enum Claim {
    /// The caller now owns the job's conversion.
    Started(ConversionRequest),
    /// The job already finished; terminal jobs only restart via a new target.
    AlreadyTerminal(JobStatus),
}

/// Shared, cheaply clonable handle to the job collection.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one job per file, all or nothing.
    ///
    /// Every file is classified before anything is inserted; one unclassifiable
    /// file fails the whole call with `UnsupportedMediaKind` and leaves the
    /// registry untouched.
    pub fn register(&self, files: Vec<UploadedFile>) -> Result<Vec<Job>, BatchError> {
        let mut classified = Vec::with_capacity(files.len());
        for file in files {
            match MediaCategory::from_content_type(&file.content_type) {
                Some(category) => classified.push((file, category)),
                None => {
                    return Err(BatchError::UnsupportedMediaKind {
                        name: file.name,
                        content_type: file.content_type,
                    })
                }
            }
        }

        let created: Vec<Job> = classified
            .into_iter()
            .map(|(file, category)| Job::new(file, category))
            .collect();

        let mut inner = self.inner.write();
        for job in &created {
            tracing::debug!(
                job_id = %job.id(),
                name = job.source_name(),
                category = %job.media_category(),
                "registered job"
            );
            inner.order.push(job.id());
            inner.jobs.insert(job.id(), job.clone());
        }

        Ok(created)
    }

    /// Assign a target extension to a job.
    ///
    /// The extension is validated against the catalog for the job's category
    /// and stored lower-cased. A terminal job returns to `Pending`. On error
    /// nothing changes.
    pub fn assign_target(&self, id: JobId, extension: &str) -> Result<(), BatchError> {
        let mut inner = self.inner.write();
        let job = inner.jobs.get_mut(&id).ok_or(BatchError::UnknownJob(id))?;

        if job.is_converting() {
            return Err(BatchError::JobBusy(id));
        }

        if !FormatCatalog::is_valid_target(job.media_category(), extension) {
            return Err(BatchError::InvalidTarget {
                extension: extension.to_string(),
                category: job.media_category(),
            });
        }

        job.set_target(extension.to_ascii_lowercase());
        tracing::debug!(job_id = %id, extension, "assigned target");
        Ok(())
    }

    /// Drop a job's target, making the registry not ready. A terminal job
    /// returns to `Pending` without its output or error.
    pub fn clear_target(&self, id: JobId) -> Result<(), BatchError> {
        let mut inner = self.inner.write();
        let job = inner.jobs.get_mut(&id).ok_or(BatchError::UnknownJob(id))?;

        if job.is_converting() {
            return Err(BatchError::JobBusy(id));
        }

        job.clear_target();
        tracing::debug!(job_id = %id, "cleared target");
        Ok(())
    }

    /// Remove a job, even mid-conversion. Returns whether it was present.
    ///
    /// Never waits on in-flight work; a conversion still running for this job
    /// completes and its result is dropped.
    pub fn remove(&self, id: JobId) -> bool {
        let mut inner = self.inner.write();
        let removed = inner.jobs.remove(&id);
        if let Some(job) = &removed {
            inner.order.retain(|existing| *existing != id);
            tracing::debug!(job_id = %id, status = %job.status(), "removed job");
        }
        removed.is_some()
    }

    /// All jobs in registration order.
    pub fn snapshot(&self) -> Vec<Job> {
        self.inner.read().ordered().cloned().collect()
    }

    pub fn get(&self, id: JobId) -> Option<Job> {
        self.inner.read().jobs.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().jobs.is_empty()
    }

    /// True iff there is at least one job and every job has a target.
    pub fn is_ready(&self) -> bool {
        self.inner.read().is_ready()
    }

    /// Discard every job. Fails with `BatchBusy` while any job is converting.
    pub fn reset(&self) -> Result<(), BatchError> {
        let mut inner = self.inner.write();
        if inner.jobs.values().any(Job::is_converting) {
            return Err(BatchError::BatchBusy);
        }

        let discarded = inner.jobs.len();
        inner.jobs.clear();
        inner.order.clear();
        tracing::info!(discarded, "registry reset");
        Ok(())
    }

    /// Result view over every live job.
    pub fn batch_result(&self) -> BatchResult {
        let ids = self.inner.read().order.clone();
        BatchResult::new(self.clone(), ids)
    }

    /// Capture the ids of a batch about to start.
    ///
    /// Checked atomically: the registry must be ready and no job may already be
    /// converting.
    pub(crate) fn capture_batch(&self) -> Result<Vec<JobId>, BatchError> {
        let inner = self.inner.read();
        if !inner.is_ready() {
            return Err(BatchError::NotReady);
        }
        if inner.jobs.values().any(Job::is_converting) {
            return Err(BatchError::BatchBusy);
        }
        Ok(inner.order.clone())
    }

    /// Live jobs among `ids`, in registration order. Removed ids are skipped.
    pub(crate) fn jobs_for(&self, ids: &[JobId]) -> Vec<Job> {
        let inner = self.inner.read();
        ids.iter().filter_map(|id| inner.jobs.get(id).cloned()).collect()
    }

    /// Move a pending job to `Converting` and hand back what the engine needs.
    ///
    /// This is the per-job mutual exclusion point: only one caller can win the
    /// transition out of `Pending`.
    pub(crate) fn claim(&self, id: JobId) -> Result<Claim, BatchError> {
        let mut inner = self.inner.write();
        let job = inner.jobs.get_mut(&id).ok_or(BatchError::UnknownJob(id))?;

        match job.status() {
            JobStatus::Converting => Err(BatchError::JobBusy(id)),
            JobStatus::Converted | JobStatus::Failed => Ok(Claim::AlreadyTerminal(job.status())),
            JobStatus::Pending => {
                let target = job
                    .target_extension()
                    .map(str::to_string)
                    .ok_or(BatchError::NotReady)?;
                let request = ConversionRequest {
                    source_bytes: job.source_bytes().clone(),
                    source_name: job.source_name().to_string(),
                    source_extension: job.source_extension().to_string(),
                    target_extension: target,
                };
                job.set_state(JobState::Converting);
                tracing::debug!(job_id = %id, "job converting");
                Ok(Claim::Started(request))
            }
        }
    }

    /// Record the engine's answer for a job this caller claimed.
    ///
    /// Returns the new status, or `None` when the job was removed while the
    /// conversion was in flight and the result was dropped.
    pub(crate) fn finish(
        &self,
        id: JobId,
        result: Result<ConvertedFile, EngineError>,
    ) -> Option<JobStatus> {
        let mut inner = self.inner.write();
        let Some(job) = inner.jobs.get_mut(&id) else {
            tracing::info!(job_id = %id, "job removed during conversion; result dropped");
            return None;
        };

        if !job.is_converting() {
            tracing::warn!(job_id = %id, status = %job.status(), "unexpected conversion result dropped");
            return Some(job.status());
        }

        match result {
            Ok(converted) => {
                tracing::info!(job_id = %id, output = %converted.file_name, "job converted");
                job.set_state(JobState::Converted(OutputRef {
                    bytes: converted.bytes,
                    file_name: converted.file_name,
                }));
            }
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "job failed");
                job.set_state(JobState::Failed(ErrorInfo {
                    message: e.to_string(),
                }));
            }
        }
        Some(job.status())
    }
}

//! Error type for registry and orchestration operations.

use crate::catalog::MediaCategory;
use crate::engine::EngineError;
use crate::job::JobId;
use thiserror::Error;

/// Errors returned synchronously to the caller. Per-job engine failures are not
/// here: they are recorded on the job and never propagated.
#[derive(Debug, Error)]
pub enum BatchError {
    /// A file's declared content type is not image, video or audio
    #[error("Unsupported media kind for '{name}': {content_type}")]
    UnsupportedMediaKind { name: String, content_type: String },

    /// No live job has this id
    #[error("Unknown job: {0}")]
    UnknownJob(JobId),

    /// Extension is not a catalog target for the job's category
    #[error("Invalid target '{extension}' for {category} source")]
    InvalidTarget {
        extension: String,
        category: MediaCategory,
    },

    /// Job is currently converting
    #[error("Job {0} is converting")]
    JobBusy(JobId),

    /// Not every job has a target, or there are no jobs
    #[error("Batch is not ready: every job needs a target format")]
    NotReady,

    /// A job is converting, so the registry cannot be reset
    #[error("Batch is busy: a conversion is in flight")]
    BatchBusy,

    /// Engine could not be initialized; no job was submitted
    #[error("Engine initialization failed: {0}")]
    EngineInit(#[source] EngineError),
}

//! mediabatch
//!
//! Batch media-conversion orchestration: tracks uploaded files as conversion
//! jobs, gates bulk conversion on every job having a valid target, drives jobs
//! through an external transcoding engine, and reports which outputs can be
//! downloaded.

pub mod batch;
pub mod catalog;
pub mod concurrency;
pub mod engine;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod registry;

pub use batch::{BatchResult, BatchSummary};
pub use catalog::{FormatCatalog, MediaCategory, TargetGroup};
pub use concurrency::{derive_plan, ConcurrencyPlan};
pub use engine::{ConversionRequest, ConvertedFile, Engine, EngineError, EngineHandle, FfmpegEngine};
pub use error::BatchError;
pub use job::{
    content_type_for_extension, format_file_size, output_file_name, ErrorInfo, Job, JobId,
    JobState, JobStatus, OutputRef, UploadedFile,
};
pub use mediabatch_config as config;
pub use mediabatch_config::Config;
pub use orchestrator::Orchestrator;
pub use registry::JobRegistry;

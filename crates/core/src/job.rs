//! Job module: one uploaded file's conversion request and its lifecycle.
//!
//! A job is created `Pending` with no target, gets a target assigned by the
//! caller, and is moved through `Converting` to a terminal state by the
//! orchestrator. Output and error payloads live inside the state variant, so a
//! job can only carry an output while `Converted` and an error while `Failed`.

use crate::catalog::MediaCategory;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable job identifier, assigned at registration and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Payload-free projection of a job's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for a target or for the batch to start.
    Pending,
    /// Owned by one in-flight engine invocation.
    Converting,
    /// Engine produced an output.
    Converted,
    /// Engine failed; the error is recorded on the job.
    Failed,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Converting => write!(f, "converting"),
            JobStatus::Converted => write!(f, "converted"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Handle to the bytes an engine produced, plus the file name to save them as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRef {
    pub bytes: Bytes,
    pub file_name: String,
}

/// Why a conversion failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// Job state with its per-state payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Converting,
    Converted(OutputRef),
    Failed(ErrorInfo),
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Converting => JobStatus::Converting,
            JobState::Converted(_) => JobStatus::Converted,
            JobState::Failed(_) => JobStatus::Failed,
        }
    }
}

/// A file handed over by the upload source.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    /// Declared MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Build an upload whose declared size is the payload length.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// One file's conversion request.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    source_name: String,
    source_size_bytes: u64,
    source_extension: String,
    media_category: MediaCategory,
    source_bytes: Bytes,
    target_extension: Option<String>,
    state: JobState,
}

impl Job {
    /// Create a pending job for an already classified upload.
    pub(crate) fn new(file: UploadedFile, media_category: MediaCategory) -> Self {
        let source_extension = source_extension(&file.name);
        Self {
            id: JobId::new(),
            source_name: file.name,
            source_size_bytes: file.size_bytes,
            source_extension,
            media_category,
            source_bytes: file.bytes,
            target_extension: None,
            state: JobState::Pending,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source_size_bytes(&self) -> u64 {
        self.source_size_bytes
    }

    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    pub fn media_category(&self) -> MediaCategory {
        self.media_category
    }

    pub fn source_bytes(&self) -> &Bytes {
        &self.source_bytes
    }

    pub fn target_extension(&self) -> Option<&str> {
        self.target_extension.as_deref()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    /// Produced output, present only when `Converted`.
    pub fn output(&self) -> Option<&OutputRef> {
        match &self.state {
            JobState::Converted(output) => Some(output),
            _ => None,
        }
    }

    /// Recorded failure, present only when `Failed`.
    pub fn error(&self) -> Option<&ErrorInfo> {
        match &self.state {
            JobState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Check if the job is in a terminal state (converted or failed).
    pub fn is_terminal(&self) -> bool {
        matches!(self.status(), JobStatus::Converted | JobStatus::Failed)
    }

    pub fn is_converting(&self) -> bool {
        self.status() == JobStatus::Converting
    }

    /// Set the target. A terminal job goes back to `Pending`, dropping its
    /// output or error. Callers must have rejected `Converting` jobs already.
    pub(crate) fn set_target(&mut self, extension: String) {
        self.target_extension = Some(extension);
        if self.is_terminal() {
            self.state = JobState::Pending;
        }
    }

    pub(crate) fn clear_target(&mut self) {
        self.target_extension = None;
        if self.is_terminal() {
            self.state = JobState::Pending;
        }
    }

    pub(crate) fn set_state(&mut self, state: JobState) {
        self.state = state;
    }
}

/// Lower-cased text after the last `.` of a file name; empty when there is none.
pub fn source_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Output file name: the source stem with the target extension.
///
/// `photo.jpg` converted to `png` becomes `photo.png`; a name without an
/// extension keeps its full text as the stem.
pub fn output_file_name(source_name: &str, target_extension: &str) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => source_name,
    };
    format!("{}.{}", stem, target_extension)
}

/// Human-readable size with two decimals (`1.50 KB`). Sizes below 1 KB are
/// shown in whole bytes.
pub fn format_file_size(size_bytes: u64) -> String {
    const UNITS: &[&str] = &["KB", "MB", "GB", "TB"];

    if size_bytes < 1024 {
        return format!("{} B", size_bytes);
    }

    let mut size = size_bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Declared content type for a file extension, used by upload sources that
/// only know a path. Unknown extensions map to `application/octet-stream`,
/// which registration rejects.
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "raw" => "image/x-raw",
        "tga" => "image/x-tga",
        "mp4" | "m4v" | "mp4v" => "video/mp4",
        "3gp" => "video/3gpp",
        "3g2" => "video/3gpp2",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "mkv" => "video/x-matroska",
        "flv" => "video/x-flv",
        "ogv" => "video/ogg",
        "webm" => "video/webm",
        "h264" | "264" => "video/h264",
        "hevc" | "265" => "video/h265",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "aac" => "audio/aac",
        "wma" => "audio/x-ms-wma",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

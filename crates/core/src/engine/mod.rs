//! Transcoding engine boundary.
//!
//! The engine is an opaque capability: it must be initialized once before it
//! accepts work, then converts source bytes to a target extension. The core
//! never inspects codec parameters; extensions are passed through as hints.

pub mod ffmpeg;

pub use ffmpeg::{build_ffmpeg_args, parse_ffmpeg_version, FfmpegEngine};

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Error type for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary or runtime could not be used
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// Work was submitted before initialization completed
    #[error("Engine is not initialized")]
    NotInitialized,

    /// Conversion process exited with non-zero status
    #[error("Conversion failed with exit code {code}: {stderr}")]
    Exited { code: i32, stderr: String },

    /// Conversion process was terminated by signal
    #[error("Conversion process was terminated by signal")]
    Terminated,

    /// Conversion exceeded the adapter's time limit
    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    /// Conversion reported success but produced nothing
    #[error("Conversion produced no output")]
    EmptyOutput,

    /// Any other engine-reported failure
    #[error("{0}")]
    Failed(String),

    /// IO error around the conversion
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the engine needs for one conversion.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source_bytes: Bytes,
    /// Original file name, used to derive the output name
    pub source_name: String,
    pub source_extension: String,
    pub target_extension: String,
}

/// Bytes produced by the engine and the file name to save them under.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub bytes: Bytes,
    pub file_name: String,
}

/// External transcoding capability.
#[async_trait]
pub trait Engine: Send + Sync {
    /// One-time load step. Called at most once successfully per handle.
    async fn initialize(&self) -> Result<(), EngineError>;

    /// Convert one file. Timeouts are the adapter's concern and surface as
    /// ordinary errors.
    async fn convert(&self, request: ConversionRequest) -> Result<ConvertedFile, EngineError>;
}

/// Owned engine plus its observable initialization state.
///
/// Initialization is serialized: concurrent callers of `ensure_initialized`
/// wait on the same attempt. A failed attempt leaves the handle uninitialized
/// so a later call can retry.
pub struct EngineHandle {
    engine: Arc<dyn Engine>,
    ready: OnceCell<()>,
}

impl EngineHandle {
    pub fn new(engine: impl Engine + 'static) -> Self {
        Self::from_arc(Arc::new(engine))
    }

    pub fn from_arc(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            ready: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.initialized()
    }

    /// Run the engine's initialization if it has not completed yet.
    pub async fn ensure_initialized(&self) -> Result<(), EngineError> {
        self.ready
            .get_or_try_init(|| async {
                tracing::info!("initializing transcoding engine");
                self.engine.initialize().await?;
                tracing::info!("transcoding engine ready");
                Ok::<(), EngineError>(())
            })
            .await
            .map(|_| ())
    }

    /// Submit a conversion. Refuses work while the engine is uninitialized.
    pub async fn convert(&self, request: ConversionRequest) -> Result<ConvertedFile, EngineError> {
        if !self.is_initialized() {
            return Err(EngineError::NotInitialized);
        }
        self.engine.convert(request).await
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

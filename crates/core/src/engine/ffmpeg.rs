//! ffmpeg engine adapter
//!
//! Runs the `ffmpeg` binary as the transcoding engine. Each conversion gets a
//! private scratch directory: the source bytes are written there, ffmpeg
//! converts them, and the output is read back into memory.

use super::{ConversionRequest, ConvertedFile, Engine, EngineError};
use crate::job::output_file_name;
use async_trait::async_trait;
use bytes::Bytes;
use mediabatch_config::EngineConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Low-bandwidth preset the 3GP container needs (small frame, mono 8 kHz AAC).
const THREE_GP_ARGS: &[&str] = &[
    "-r", "20", "-s", "352x288", "-vb", "400k", "-acodec", "aac", "-strict", "experimental",
    "-ac", "1", "-ar", "8000", "-ab", "24k",
];

/// Number of trailing stderr lines kept in a failure message
const STDERR_TAIL_LINES: usize = 20;

/// Build the ffmpeg argument list for one conversion
///
/// The output container is chosen by ffmpeg from the output extension; only
/// targets that need explicit encoder settings get extra arguments.
pub fn build_ffmpeg_args(input: &Path, output: &Path, target_extension: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-y".into(), "-i".into()];
    args.push(input.as_os_str().to_owned());

    if target_extension.eq_ignore_ascii_case("3gp") {
        args.extend(THREE_GP_ARGS.iter().map(OsString::from));
    }

    args.push(output.as_os_str().to_owned());
    args
}

/// Parse FFmpeg version string and extract major version number
///
/// Handles various FFmpeg version formats:
/// - Standard: "ffmpeg version 8.0 ..."
/// - N-prefixed: "ffmpeg version n8.0-... ..."
pub fn parse_ffmpeg_version(version_output: &str) -> Option<u32> {
    let version_line = version_output
        .lines()
        .find(|line| line.to_lowercase().contains("ffmpeg version"))?;

    let version_part = version_line
        .to_lowercase()
        .split("ffmpeg version")
        .nth(1)?
        .split_whitespace()
        .next()?
        .to_string();

    let version_str = version_part.trim_start_matches('n');

    let major_str = version_str.split(|c| c == '.' || c == '-').next()?;

    major_str.parse().ok()
}

/// Engine backed by the ffmpeg command-line tool
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg_path: PathBuf,
    timeout: Option<Duration>,
    work_dir: Option<PathBuf>,
}

impl FfmpegEngine {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout: None,
            work_dir: None,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        let timeout = (cfg.conversion_timeout_secs > 0)
            .then(|| Duration::from_secs(cfg.conversion_timeout_secs));
        Self {
            ffmpeg_path: cfg.ffmpeg_path.clone(),
            timeout,
            work_dir: cfg.work_dir.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    fn scratch_dir(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("mediabatch-");
        match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }

    async fn run(&self, args: Vec<OsString>) -> Result<(), EngineError> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| EngineError::Timeout(limit))??,
            None => cmd.output().await?,
        };

        if output.status.success() {
            return Ok(());
        }

        match output.status.code() {
            Some(code) => Err(EngineError::Exited {
                code,
                stderr: stderr_tail(&output.stderr),
            }),
            None => Err(EngineError::Terminated),
        }
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[async_trait]
impl Engine for FfmpegEngine {
    async fn initialize(&self) -> Result<(), EngineError> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                EngineError::Unavailable(format!(
                    "{} -version failed; is ffmpeg installed and in PATH? Error: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(EngineError::Unavailable(format!(
                "{} -version exited with {}",
                self.ffmpeg_path.display(),
                output.status
            )));
        }

        let version_output = String::from_utf8_lossy(&output.stdout);
        let major = parse_ffmpeg_version(&version_output).ok_or_else(|| {
            EngineError::Unavailable(format!(
                "Could not parse FFmpeg version from output: {}",
                version_output.lines().next().unwrap_or("(empty)")
            ))
        })?;

        tracing::info!(ffmpeg = %self.ffmpeg_path.display(), major, "ffmpeg available");
        Ok(())
    }

    async fn convert(&self, request: ConversionRequest) -> Result<ConvertedFile, EngineError> {
        if !is_plain_extension(&request.target_extension) {
            return Err(EngineError::Failed(format!(
                "unusable target extension {:?}",
                request.target_extension
            )));
        }
        let scratch = self.scratch_dir()?;

        let input_path = scratch
            .path()
            .join(scratch_file_name("input", &request.source_extension));
        let output_path = scratch
            .path()
            .join(scratch_file_name("output", &request.target_extension));

        tokio::fs::write(&input_path, &request.source_bytes).await?;

        let args = build_ffmpeg_args(&input_path, &output_path, &request.target_extension);
        tracing::debug!(
            source = %request.source_name,
            to = %request.target_extension,
            "running ffmpeg"
        );
        self.run(args).await?;

        let bytes = tokio::fs::read(&output_path).await?;
        if bytes.is_empty() {
            return Err(EngineError::EmptyOutput);
        }

        Ok(ConvertedFile {
            bytes: Bytes::from(bytes),
            file_name: output_file_name(&request.source_name, &request.target_extension),
        })
    }
}

/// Non-empty and ASCII alphanumeric only.
fn is_plain_extension(extension: &str) -> bool {
    !extension.is_empty() && extension.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Name for a file inside the scratch dir. Extensions taken from upload names
/// are only kept when plain; anything else leaves the name bare and ffmpeg
/// probes the input instead.
fn scratch_file_name(stem: &str, extension: &str) -> String {
    if is_plain_extension(extension) {
        format!("{}.{}", stem, extension)
    } else {
        stem.to_string()
    }
}

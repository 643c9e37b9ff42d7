//! Core configuration structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Transcoding engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Path or name of the ffmpeg binary (default "ffmpeg")
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Per-conversion timeout in seconds (0 = no timeout)
    #[serde(default = "default_conversion_timeout_secs")]
    pub conversion_timeout_secs: u64,
    /// Scratch directory for conversion inputs/outputs (system temp dir if None)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_conversion_timeout_secs() -> u64 {
    600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            conversion_timeout_secs: default_conversion_timeout_secs(),
            work_dir: None,
        }
    }
}

/// Batch concurrency configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConcurrencyConfig {
    /// Number of logical cores (auto-detected if None)
    #[serde(default)]
    pub logical_cores: Option<u32>,
    /// Maximum conversions in flight (default 1, 0 = auto-derive)
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: u32,
}

fn default_max_concurrent_jobs() -> u32 {
    1
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            logical_cores: None,
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Parses the config.toml file and handles missing optional fields with defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - MEDIABATCH_FFMPEG_PATH -> engine.ffmpeg_path
    /// - MEDIABATCH_CONVERSION_TIMEOUT_SECS -> engine.conversion_timeout_secs
    /// - MEDIABATCH_WORK_DIR -> engine.work_dir
    /// - MEDIABATCH_LOGICAL_CORES -> concurrency.logical_cores
    /// - MEDIABATCH_MAX_CONCURRENT_JOBS -> concurrency.max_concurrent_jobs
    ///
    /// Unparseable numeric values are ignored and the existing value is kept.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("MEDIABATCH_FFMPEG_PATH") {
            if !val.is_empty() {
                self.engine.ffmpeg_path = PathBuf::from(val);
            }
        }

        if let Ok(val) = env::var("MEDIABATCH_CONVERSION_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                self.engine.conversion_timeout_secs = secs;
            }
        }

        if let Ok(val) = env::var("MEDIABATCH_WORK_DIR") {
            if !val.is_empty() {
                self.engine.work_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = env::var("MEDIABATCH_LOGICAL_CORES") {
            if let Ok(cores) = val.parse::<u32>() {
                self.concurrency.logical_cores = Some(cores);
            }
        }

        if let Ok(val) = env::var("MEDIABATCH_MAX_CONCURRENT_JOBS") {
            if let Ok(jobs) = val.parse::<u32>() {
                self.concurrency.max_concurrent_jobs = jobs;
            }
        }
    }

    /// Load configuration from file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a config file
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }
}

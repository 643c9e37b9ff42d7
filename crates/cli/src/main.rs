//! CLI entry point for mediabatch
//!
//! Reads media files from disk, assigns a target format per media category,
//! converts the batch through ffmpeg and writes every converted output.

mod report;
mod upload;

use clap::{Parser, Subcommand};
use mediabatch::{
    derive_plan, BatchError, Config, EngineHandle, FfmpegEngine, FormatCatalog, JobRegistry,
    MediaCategory, Orchestrator,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// mediabatch - convert a batch of images, videos and audio files
#[derive(Parser, Debug)]
#[command(name = "mediabatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (config.toml); defaults plus env overrides if omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert files (directories are walked recursively)
    Convert {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target for every file whose category has no specific target
        #[arg(long)]
        to: Option<String>,

        /// Target for image files
        #[arg(long)]
        image_to: Option<String>,

        /// Target for video files (a video or an audio extension)
        #[arg(long)]
        video_to: Option<String>,

        /// Target for audio files
        #[arg(long)]
        audio_to: Option<String>,

        /// Directory converted files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List valid target formats per media category
    Formats,
}

/// Per-category target selection from the command line
#[derive(Debug, Clone, Default)]
pub struct TargetChoice {
    pub fallback: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub audio: Option<String>,
}

impl TargetChoice {
    pub fn for_category(&self, category: MediaCategory) -> Option<&str> {
        let specific = match category {
            MediaCategory::Image => &self.image,
            MediaCategory::Video => &self.video,
            MediaCategory::Audio => &self.audio,
        };
        specific.as_deref().or(self.fallback.as_deref())
    }
}

fn init_logging(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "mediabatch=debug,mediabatch_cli=debug".to_string()
        } else {
            "mediabatch=info,mediabatch_cli=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, mediabatch::config::ConfigError> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::from_env()),
    }
}

fn print_formats() {
    for category in [MediaCategory::Image, MediaCategory::Video, MediaCategory::Audio] {
        println!("{}:", category);
        for group in FormatCatalog::target_groups(category) {
            println!("  {:<6} {}", group.label, group.extensions.join(" "));
        }
    }
}

async fn convert(
    config: Config,
    inputs: Vec<PathBuf>,
    targets: TargetChoice,
    out_dir: PathBuf,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let files = upload::collect_uploads(&inputs).await?;
    if files.is_empty() {
        return Err("no input files found".into());
    }

    let registry = JobRegistry::new();
    let jobs = registry.register(files)?;

    for job in &jobs {
        if let Some(target) = targets.for_category(job.media_category()) {
            registry.assign_target(job.id(), target)?;
        }
    }

    if !registry.is_ready() {
        for job in registry.snapshot() {
            if job.target_extension().is_none() {
                tracing::error!(
                    file = job.source_name(),
                    category = %job.media_category(),
                    "no target format for this file's category"
                );
            }
        }
        return Err(BatchError::NotReady.into());
    }

    let plan = derive_plan(&config);
    let engine = EngineHandle::new(FfmpegEngine::from_config(&config.engine));
    let orchestrator = Orchestrator::new(engine, plan);

    let result = orchestrator.convert_batch(&registry).await?;
    let written = report::write_outputs(&result.downloadable(), &out_dir).await?;

    if json {
        println!("{}", report::json_report(&result, &written)?);
    } else {
        report::print_report(&result, &written);
    }

    Ok(!result.has_any_failure())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Command::Formats => {
            print_formats();
            ExitCode::SUCCESS
        }
        Command::Convert {
            inputs,
            to,
            image_to,
            video_to,
            audio_to,
            out_dir,
            json,
        } => {
            let targets = TargetChoice {
                fallback: to,
                image: image_to,
                video: video_to,
                audio: audio_to,
            };
            match convert(config, inputs, targets, out_dir, json).await {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::FAILURE,
                Err(e) => {
                    eprintln!("Conversion failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

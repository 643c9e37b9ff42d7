//! Download sink and batch report.

use mediabatch::{format_file_size, BatchResult, BatchSummary, Job, JobId, JobStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One line of the JSON report
#[derive(Debug, Serialize)]
pub struct JobReport {
    pub id: String,
    pub source: String,
    pub size_bytes: u64,
    pub category: String,
    pub target: Option<String>,
    pub status: JobStatus,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub jobs: Vec<JobReport>,
}

/// Pick a path in `dir` for `file_name` that does not exist yet, appending
/// ` (1)`, ` (2)`, ... to the stem on collision.
pub fn unique_output_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Write every downloadable job's output into `dir`. Returns where each job's
/// output landed.
pub async fn write_outputs(jobs: &[Job], dir: &Path) -> std::io::Result<HashMap<JobId, PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = HashMap::new();
    for job in jobs {
        let Some(output) = job.output() else {
            continue;
        };
        let path = unique_output_path(dir, &output.file_name);
        tokio::fs::write(&path, &output.bytes).await?;
        tracing::info!(source = job.source_name(), output = %path.display(), "wrote output");
        written.insert(job.id(), path);
    }
    Ok(written)
}

pub fn build_report(result: &BatchResult, written: &HashMap<JobId, PathBuf>) -> BatchReport {
    let jobs = result
        .jobs()
        .iter()
        .map(|job| JobReport {
            id: job.id().to_string(),
            source: job.source_name().to_string(),
            size_bytes: job.source_size_bytes(),
            category: job.media_category().to_string(),
            target: job.target_extension().map(str::to_string),
            status: job.status(),
            output: written.get(&job.id()).cloned(),
            error: job.error().map(|e| e.message.clone()),
        })
        .collect();

    BatchReport {
        summary: result.summary(),
        jobs,
    }
}

pub fn json_report(
    result: &BatchResult,
    written: &HashMap<JobId, PathBuf>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&build_report(result, written))
}

pub fn print_report(result: &BatchResult, written: &HashMap<JobId, PathBuf>) {
    let report = build_report(result, written);
    for job in &report.jobs {
        let detail = match (job.status, &job.output, &job.error) {
            (JobStatus::Converted, Some(path), _) => format!("-> {}", path.display()),
            (JobStatus::Failed, _, Some(error)) => format!("error: {}", error),
            _ => String::new(),
        };
        println!(
            "{:<10} {} ({}) {}",
            job.status.to_string(),
            job.source,
            format_file_size(job.size_bytes),
            detail
        );
    }
    println!(
        "{} converted, {} failed",
        report.summary.converted, report.summary.failed
    );
}

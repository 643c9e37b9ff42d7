//! Upload source: turns paths on disk into uploaded files.

use mediabatch::{content_type_for_extension, UploadedFile};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand inputs into file paths. Directories are walked recursively and their
/// files taken in name order; plain files are kept as given.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let walker = WalkDir::new(input).sort_by_file_name().into_iter();
            for entry in walker.filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    paths.push(entry.into_path());
                }
            }
        } else {
            paths.push(input.clone());
        }
    }
    paths
}

/// Read every input into memory with a content type guessed from its extension.
pub async fn collect_uploads(inputs: &[PathBuf]) -> std::io::Result<Vec<UploadedFile>> {
    let mut uploads = Vec::new();
    for path in expand_inputs(inputs) {
        uploads.push(read_upload(&path).await?);
    }
    Ok(uploads)
}

async fn read_upload(path: &Path) -> std::io::Result<UploadedFile> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::debug!(path = %path.display(), size = bytes.len(), "read upload");
    Ok(UploadedFile::new(
        name,
        content_type_for_extension(&extension),
        bytes,
    ))
}

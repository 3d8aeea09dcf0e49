//! Filesystem helpers for compression inputs and outputs.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Container extensions accepted as compression input.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Build the output path for `input`: `stem + suffix + extension`.
///
/// The file lands in `output_dir` when given, otherwise next to the input.
pub fn output_path_for(input: &Path, suffix: &str, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    dir.join(file_name)
}

/// Size of a file in bytes, `None` if it does not exist or cannot be read.
pub async fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).await.ok().filter(|m| m.is_file()).map(|m| m.len())
}

/// Remove a partially written output (best effort).
pub async fn remove_partial_output(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Failed to remove partial output {}: {}",
            path.display(),
            e
        ),
    }
}

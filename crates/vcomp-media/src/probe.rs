//! Duration probing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Default bound on a single probe call.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shortest video the compressor accepts, in seconds.
pub const MIN_DURATION_SECS: f64 = 0.1;

/// Lightweight metadata read that yields a video's duration.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration of `path` in seconds.
    async fn duration(&self, path: &Path) -> MediaResult<f64>;
}

/// `ffprobe`-backed duration probe with a bounded runtime.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    binary: PathBuf,
    timeout: Duration,
}

impl FfprobeDurationProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Set the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn duration(&self, path: &Path) -> MediaResult<f64> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let child = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MediaError::FfprobeNotFound,
                _ => MediaError::Io(e),
            })?,
            Err(_) => return Err(MediaError::Timeout(self.timeout.as_secs())),
        };

        if !output.status.success() {
            return Err(MediaError::ffprobe_failed(
                "FFprobe failed",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(path = %path.display(), output = %stdout.trim(), "FFprobe duration");
        parse_probe_output(&stdout).and_then(validate_duration)
    }
}

/// Parse the single-number output of the duration probe.
///
/// Output that is not a number (`N/A` for streams without a container
/// duration) means no duration was read, not that it was invalid.
pub fn parse_probe_output(stdout: &str) -> MediaResult<f64> {
    let text = stdout.trim();
    if text.is_empty() {
        return Err(MediaError::ffprobe_failed("FFprobe returned no duration", None));
    }
    text.parse::<f64>().map_err(|_| {
        MediaError::ffprobe_failed("FFprobe returned no duration", Some(text.to_string()))
    })
}

/// Parse the `Duration: HH:MM:SS.ss` line FFmpeg prints when opening an input.
pub fn parse_ffmpeg_duration(diagnostics: &str) -> Option<f64> {
    let line = diagnostics.lines().find(|l| l.trim_start().starts_with("Duration:"))?;
    let value = line.trim_start().strip_prefix("Duration:")?.trim();
    let timestamp = value.split(',').next()?.trim();

    let mut parts = timestamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Reject durations the compressor cannot work with.
pub fn validate_duration(duration: f64) -> MediaResult<f64> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(MediaError::invalid_duration(format!(
            "{} seconds",
            duration
        )));
    }
    if duration < MIN_DURATION_SECS {
        return Err(MediaError::TooShort(duration));
    }
    Ok(duration)
}

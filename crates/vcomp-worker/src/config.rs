//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vcomp_models::{CompressionSettings, Preset, DEFAULT_SUFFIX, DEFAULT_TARGET_SIZE_MB};

use crate::timeout::DEFAULT_TIMEOUT_SECS;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Target output size in MB
    pub target_size_mb: f64,
    /// Suffix appended to output file stems
    pub suffix: String,
    /// Output folder; `None` writes next to each input
    pub output_dir: Option<PathBuf>,
    /// Encoder speed/quality preset
    pub preset: Preset,
    /// Bound on the duration probe
    pub probe_timeout: Duration,
    /// Deadline used when the duration is unknown
    pub default_job_timeout: Duration,
    /// Encoder thread count
    pub encoder_threads: u32,
    /// Explicit FFmpeg executable
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit FFprobe executable
    pub ffprobe_path: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            target_size_mb: DEFAULT_TARGET_SIZE_MB,
            suffix: DEFAULT_SUFFIX.to_string(),
            output_dir: None,
            preset: Preset::default(),
            probe_timeout: Duration::from_secs(10),
            default_job_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            encoder_threads: 4,
            ffmpeg_path: None,
            ffprobe_path: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            target_size_mb: env_parse("VCOMP_TARGET_SIZE_MB").unwrap_or(defaults.target_size_mb),
            suffix: std::env::var("VCOMP_SUFFIX")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.suffix),
            output_dir: env_path("VCOMP_OUTPUT_DIR"),
            preset: env_parse("VCOMP_PRESET").unwrap_or(defaults.preset),
            probe_timeout: env_parse("VCOMP_PROBE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.probe_timeout),
            default_job_timeout: env_parse("VCOMP_DEFAULT_JOB_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_job_timeout),
            encoder_threads: env_parse("VCOMP_ENCODER_THREADS").unwrap_or(defaults.encoder_threads),
            ffmpeg_path: env_path("VCOMP_FFMPEG_PATH"),
            ffprobe_path: env_path("VCOMP_FFPROBE_PATH"),
        }
    }

    /// Per-batch settings derived from this config.
    pub fn compression_settings(&self) -> CompressionSettings {
        CompressionSettings {
            target_size_mb: self.target_size_mb,
            suffix: self.suffix.clone(),
            output_dir: self.output_dir.clone(),
            preset: self.preset,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

//! FFmpeg CLI wrapper for size-targeted video compression.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Bounded duration probing through FFprobe
//! - The [`Encoder`] and [`DurationProbe`] seams the batch worker drives

pub mod command;
pub mod encoder;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod progress;

pub use command::{resolve_ffmpeg, resolve_ffprobe, FfmpegCommand, FfmpegRunner};
pub use encoder::{EncodeRequest, Encoder, FfmpegEncoder, MIN_INPUT_BYTES};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{file_size, is_supported_video, output_path_for, SUPPORTED_EXTENSIONS};
pub use probe::{
    validate_duration, DurationProbe, FfprobeDurationProbe, DEFAULT_PROBE_TIMEOUT,
    MIN_DURATION_SECS,
};
pub use progress::{FfmpegProgress, ProgressCallback};

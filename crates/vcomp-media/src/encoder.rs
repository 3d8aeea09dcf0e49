//! Size-targeted H.264 encoder.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use vcomp_models::Preset;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{file_size, remove_partial_output};
use crate::probe::{parse_ffmpeg_duration, validate_duration};
use crate::progress::ProgressCallback;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoder thread count
pub const DEFAULT_THREADS: u32 = 4;
/// Inputs smaller than this are rejected as invalid videos
pub const MIN_INPUT_BYTES: u64 = 1024;

/// One encode invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub preset: Preset,
}

/// External encoding operation.
///
/// `encode` completes only when the encode has finished; implementations
/// translate every lower-level failure into a [`MediaError`].
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encode `request.input` into `request.output`.
    async fn encode(
        &self,
        request: &EncodeRequest,
        progress: Option<ProgressCallback>,
    ) -> MediaResult<()>;

    /// Read the input duration from the encoder's own view of the container.
    async fn read_duration(&self, input: &Path) -> MediaResult<f64>;
}

/// FFmpeg-backed encoder.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
    threads: u32,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            threads: DEFAULT_THREADS,
        }
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Build the FFmpeg command for a request.
    pub fn build_command(&self, request: &EncodeRequest) -> FfmpegCommand {
        FfmpegCommand::new(&request.input, &request.output)
            .video_codec(DEFAULT_VIDEO_CODEC)
            .video_bitrate_kbps(request.video_bitrate_kbps)
            .audio_codec(DEFAULT_AUDIO_CODEC)
            .audio_bitrate_kbps(request.audio_bitrate_kbps)
            .preset(request.preset.encoder_preset())
            .threads(self.threads)
            .log_level("error")
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(
        &self,
        request: &EncodeRequest,
        progress: Option<ProgressCallback>,
    ) -> MediaResult<()> {
        check_input(&request.input).await?;

        let cmd = self.build_command(request);
        let runner = FfmpegRunner::new(&self.binary);

        let result = match progress {
            Some(callback) => runner.run_with_progress(&cmd, callback).await,
            None => runner.run(&cmd).await,
        };

        if let Err(e) = result {
            remove_partial_output(&request.output).await;
            return Err(e);
        }

        match file_size(&request.output).await {
            Some(size) if size > 0 => {
                info!(
                    output = %request.output.display(),
                    size_mb = size as f64 / (1024.0 * 1024.0),
                    "Encode finished"
                );
                Ok(())
            }
            _ => Err(MediaError::OutputMissing(request.output.clone())),
        }
    }

    async fn read_duration(&self, input: &Path) -> MediaResult<f64> {
        check_input(input).await?;

        // `ffmpeg -i` without an output exits non-zero but still prints the
        // container header.
        let output = Command::new(&self.binary)
            .args(["-hide_banner", "-nostdin", "-i"])
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MediaError::FfmpegNotFound,
                _ => MediaError::Io(e),
            })?;

        let diagnostics = String::from_utf8_lossy(&output.stderr);
        let duration = parse_ffmpeg_duration(&diagnostics).ok_or_else(|| {
            MediaError::invalid_duration(format!("no duration in metadata of {}", input.display()))
        })?;
        debug!(input = %input.display(), duration, "Duration from encoder metadata");
        validate_duration(duration)
    }
}

/// Reject inputs that are missing or too small to be a video.
pub async fn check_input(input: &Path) -> MediaResult<u64> {
    let size = file_size(input)
        .await
        .ok_or_else(|| MediaError::FileNotFound(input.to_path_buf()))?;
    if size < MIN_INPUT_BYTES {
        return Err(MediaError::InputTooSmall {
            path: input.to_path_buf(),
            size,
        });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request(input: PathBuf, output: PathBuf) -> EncodeRequest {
        EncodeRequest {
            input,
            output,
            video_bitrate_kbps: 2516,
            audio_bitrate_kbps: 128,
            preset: Preset::Balanced,
        }
    }

    #[test]
    fn test_build_command() {
        let encoder = FfmpegEncoder::new("ffmpeg");
        let req = request("/v/in.mp4".into(), "/v/in_compressed.mp4".into());
        let args = encoder.build_command(&req).build_args();

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-c:v") + 1], "libx264");
        assert_eq!(args[pos("-c:a") + 1], "aac");
        assert_eq!(args[pos("-b:v") + 1], "2516k");
        assert_eq!(args[pos("-preset") + 1], "medium");
        assert_eq!(args[pos("-threads") + 1], "4");
        assert_eq!(args.last().unwrap(), "/v/in_compressed.mp4");
    }

    #[tokio::test]
    async fn test_check_input_rejects_missing_and_tiny_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.mp4");
        assert!(matches!(check_input(&missing).await, Err(MediaError::FileNotFound(_))));

        let tiny = dir.path().join("tiny.mp4");
        tokio::fs::write(&tiny, vec![0u8; 100]).await.unwrap();
        assert!(matches!(
            check_input(&tiny).await,
            Err(MediaError::InputTooSmall { size: 100, .. })
        ));

        let ok = dir.path().join("ok.mp4");
        tokio::fs::write(&ok, vec![0u8; 4096]).await.unwrap();
        assert_eq!(check_input(&ok).await.unwrap(), 4096);
    }

    #[tokio::test]
    async fn test_encode_tiny_input_fails_without_spawning() {
        let dir = TempDir::new().unwrap();
        let tiny = dir.path().join("tiny.mp4");
        tokio::fs::write(&tiny, b"not a video").await.unwrap();

        let encoder = FfmpegEncoder::new("/nonexistent/ffmpeg");
        let req = request(tiny, dir.path().join("out.mp4"));
        let err = encoder.encode(&req, None).await.unwrap_err();
        assert!(matches!(err, MediaError::InputTooSmall { .. }));
    }

    #[tokio::test]
    async fn test_encode_missing_binary_cleans_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, vec![1u8; 4096]).await.unwrap();
        let output = dir.path().join("out.mp4");
        tokio::fs::write(&output, b"stale").await.unwrap();

        let encoder = FfmpegEncoder::new("/nonexistent/ffmpeg");
        let err = encoder.encode(&request(input, output.clone()), None).await.unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound));
        assert!(!output.exists());
    }
}

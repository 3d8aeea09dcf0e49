//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::progress::{is_progress_line, parse_progress_line, FfmpegProgress};

/// Number of diagnostic stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set video bitrate in kbps.
    pub fn video_bitrate_kbps(self, kbps: u32) -> Self {
        self.output_arg("-b:v").output_arg(format!("{}k", kbps))
    }

    /// Set audio bitrate in kbps.
    pub fn audio_bitrate_kbps(self, kbps: u32) -> Self {
        self.output_arg("-b:a").output_arg(format!("{}k", kbps))
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set encoder thread count.
    pub fn threads(self, threads: u32) -> Self {
        self.output_arg("-threads").output_arg(threads.to_string())
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// FFmpeg executable
    binary: PathBuf,
}

impl FfmpegRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    ///
    /// The child is always reaped before returning, including on error.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        progress_callback: F,
    ) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MediaError::FfmpegNotFound,
                _ => MediaError::Io(e),
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr was not captured"))?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress lines go to the callback, everything else is kept as diagnostics.
        let stderr_task = tokio::spawn(async move {
            let mut current = FfmpegProgress::default();
            let mut diagnostics: Vec<String> = Vec::new();

            while let Ok(Some(line)) = reader.next_line().await {
                if is_progress_line(&line) {
                    if let Some(progress) = parse_progress_line(&line, &mut current) {
                        progress_callback(progress);
                    }
                } else if !line.trim().is_empty() {
                    if diagnostics.len() == STDERR_TAIL_LINES {
                        diagnostics.remove(0);
                    }
                    diagnostics.push(line);
                }
            }
            diagnostics
        });

        let status = child.wait().await?;
        let diagnostics = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            let stderr = (!diagnostics.is_empty()).then(|| diagnostics.join("\n"));
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                stderr,
                status.code(),
            ))
        }
    }
}

/// Resolve the FFmpeg executable, honouring an explicit override.
pub fn resolve_ffmpeg(override_path: Option<&Path>) -> MediaResult<PathBuf> {
    resolve_binary("ffmpeg", override_path).ok_or(MediaError::FfmpegNotFound)
}

/// Resolve the FFprobe executable, honouring an explicit override.
pub fn resolve_ffprobe(override_path: Option<&Path>) -> MediaResult<PathBuf> {
    resolve_binary("ffprobe", override_path).ok_or(MediaError::FfprobeNotFound)
}

fn resolve_binary(name: &str, override_path: Option<&Path>) -> Option<PathBuf> {
    match override_path {
        Some(path) => which::which(path).ok(),
        None => which::which(name).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .video_codec("libx264")
            .video_bitrate_kbps(2516)
            .audio_codec("aac")
            .audio_bitrate_kbps(128)
            .preset("faster")
            .threads(4);

        let args = cmd.build_args();
        assert_eq!(args.first().map(String::as_str), Some("-y"));
        assert_eq!(args.last().map(String::as_str), Some("output.mp4"));

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-b:v") + 1], "2516k");
        assert_eq!(args[pos("-b:a") + 1], "128k");
        assert_eq!(args[pos("-preset") + 1], "faster");
        assert_eq!(args[pos("-threads") + 1], "4");
        assert_eq!(args[pos("-progress") + 1], "pipe:2");
        assert!(pos("-i") < pos("-c:v"));
        // Nothing sits between the global flags and the input.
        assert_eq!(pos("-progress") + 2, pos("-i"));
        assert_eq!(args[pos("-i") + 1], "input.mp4");
    }

    #[test]
    fn test_resolve_missing_override() {
        let missing = Path::new("/nonexistent/bin/ffmpeg-does-not-exist");
        assert!(matches!(
            resolve_ffmpeg(Some(missing)),
            Err(MediaError::FfmpegNotFound)
        ));
        assert!(matches!(
            resolve_ffprobe(Some(missing)),
            Err(MediaError::FfprobeNotFound)
        ));
    }

    #[tokio::test]
    async fn test_runner_reports_missing_binary() {
        let runner = FfmpegRunner::new("/nonexistent/bin/ffmpeg-does-not-exist");
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4");
        let err = runner.run(&cmd).await.unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound));
    }
}

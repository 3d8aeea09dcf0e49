//! The per-item compression job.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use vcomp_media::{file_size, EncodeRequest, Encoder, FfmpegProgress, MediaError};
use vcomp_models::CompressionSettings;

use crate::bitrate::calculate_bitrate;
use crate::error::WorkerError;
use crate::logging::ItemLogger;
use crate::runner::Abandoned;

/// Detail reported when the encoder claims success but wrote nothing.
pub const OUTPUT_MISSING_DETAIL: &str = "output file was not created";

/// Outputs above this multiple of the target size are flagged.
pub const OVERSIZE_TOLERANCE: f64 = 1.1;

/// Everything one item needs to compress, owned so it can move onto its own task.
pub struct CompressJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Duration from the primary probe, if it succeeded
    pub duration: Option<f64>,
    pub settings: CompressionSettings,
    pub encoder: Arc<dyn Encoder>,
    pub logger: ItemLogger,
}

impl CompressJob {
    /// Compress the input. Resolves to the output size in bytes.
    ///
    /// Batch events stop once `abandoned` is set.
    pub async fn run(self, abandoned: Abandoned) -> Result<u64, String> {
        let logger = self.logger.until_abandoned(abandoned);

        let duration = match self.duration {
            Some(duration) => duration,
            None => {
                let duration = self
                    .encoder
                    .read_duration(&self.input)
                    .await
                    .map_err(|e| WorkerError::probe_failure(e.detail()).to_string())?;
                logger.duration_from_metadata(duration);
                duration
            }
        };

        let bitrate =
            calculate_bitrate(duration, self.settings.target_size_mb).map_err(|e| e.to_string())?;
        logger.bitrate(duration, &bitrate);

        let request = EncodeRequest {
            input: self.input.clone(),
            output: self.output.clone(),
            video_bitrate_kbps: bitrate.video_kbps,
            audio_bitrate_kbps: bitrate.audio_kbps,
            preset: self.settings.preset,
        };

        let progress_logger = logger.clone();
        let last_percent = AtomicU8::new(0);
        let on_progress = move |progress: FfmpegProgress| {
            let percent = progress.percent_of(duration);
            if last_percent.fetch_max(percent, Ordering::Relaxed) < percent {
                progress_logger.encode_progress(percent);
            }
        };

        match self.encoder.encode(&request, Some(Box::new(on_progress))).await {
            Ok(()) => {}
            Err(MediaError::OutputMissing(_)) => return Err(OUTPUT_MISSING_DETAIL.to_string()),
            Err(e) => return Err(WorkerError::encode_failure(e.detail()).to_string()),
        }

        let size = match file_size(&self.output).await {
            Some(size) if size > 0 => size,
            _ => return Err(OUTPUT_MISSING_DETAIL.to_string()),
        };

        let target = self.settings.target_size_bytes() as f64;
        if size as f64 > target * OVERSIZE_TOLERANCE {
            logger.oversized(size, self.settings.target_size_mb);
        }

        Ok(size)
    }
}

//! Target-size bitrate calculation.

use crate::error::{WorkerError, WorkerResult};

/// Lowest video bitrate handed to the encoder, in kbps.
pub const MIN_VIDEO_BITRATE_KBPS: u32 = 400;
/// Highest video bitrate handed to the encoder, in kbps.
pub const MAX_VIDEO_BITRATE_KBPS: u32 = 5000;
/// Fixed audio bitrate, in kbps.
pub const AUDIO_BITRATE_KBPS: u32 = 128;
/// Share of the byte budget given to the video stream.
pub const VIDEO_BUDGET_SHARE: f64 = 0.9;

/// Which bound, if any, the raw bitrate was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateClamp {
    None,
    Floor,
    Ceiling,
}

impl BitrateClamp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BitrateClamp::None => "none",
            BitrateClamp::Floor => "floor",
            BitrateClamp::Ceiling => "ceiling",
        }
    }
}

/// Encoder bitrates for one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitrate {
    pub video_kbps: u32,
    pub audio_kbps: u32,
    /// Video bitrate before clamping
    pub raw_video_kbps: u64,
    pub clamp: BitrateClamp,
}

impl Bitrate {
    pub fn was_clamped(&self) -> bool {
        self.clamp != BitrateClamp::None
    }
}

/// Compute the bitrates that land a `duration`-second video near `target_size_mb`.
///
/// 90% of the byte budget goes to video; the rest is left for audio and
/// container overhead. The video bitrate is clamped to
/// [`MIN_VIDEO_BITRATE_KBPS`]..=[`MAX_VIDEO_BITRATE_KBPS`].
pub fn calculate_bitrate(duration: f64, target_size_mb: f64) -> WorkerResult<Bitrate> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(WorkerError::invalid_input(format!(
            "duration must be positive, got {}",
            duration
        )));
    }
    if !target_size_mb.is_finite() || target_size_mb <= 0.0 {
        return Err(WorkerError::invalid_input(format!(
            "target size must be positive, got {} MB",
            target_size_mb
        )));
    }

    let target_bits = target_size_mb * 8.0 * 1024.0 * 1024.0;
    let raw = (target_bits * VIDEO_BUDGET_SHARE / duration / 1000.0) as u64;

    let (video_kbps, clamp) = if raw < MIN_VIDEO_BITRATE_KBPS as u64 {
        (MIN_VIDEO_BITRATE_KBPS, BitrateClamp::Floor)
    } else if raw > MAX_VIDEO_BITRATE_KBPS as u64 {
        (MAX_VIDEO_BITRATE_KBPS, BitrateClamp::Ceiling)
    } else {
        (raw as u32, BitrateClamp::None)
    };

    Ok(Bitrate {
        video_kbps,
        audio_kbps: AUDIO_BITRATE_KBPS,
        raw_video_kbps: raw,
        clamp,
    })
}

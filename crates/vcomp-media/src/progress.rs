//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg's `-progress` output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Progress percentage given the input duration in seconds.
    pub fn percent_of(&self, duration_secs: f64) -> u8 {
        if self.is_complete {
            return 100;
        }
        if duration_secs <= 0.0 || self.out_time_ms <= 0 {
            return 0;
        }
        let pct = (self.out_time_ms as f64 / 1000.0) / duration_secs * 100.0;
        pct.clamp(0.0, 100.0) as u8
    }

    /// Estimated seconds remaining, if the encoder reported a speed.
    pub fn eta_seconds(&self, duration_secs: f64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_ms <= 0 {
            return None;
        }
        let remaining = duration_secs - self.out_time_ms as f64 / 1000.0;
        if remaining <= 0.0 {
            return Some(0.0);
        }
        Some(remaining / self.speed)
    }
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(FfmpegProgress) + Send + Sync + 'static>;

/// Parse a line of `-progress` output.
///
/// Updates `current` in place and returns a snapshot at the end of each
/// progress block (`progress=continue|end`). Returns `None` for lines that
/// are not `key=value` pairs, which callers treat as diagnostics.
pub(crate) fn parse_progress_line(
    line: &str,
    current: &mut FfmpegProgress,
) -> Option<FfmpegProgress> {
    let (key, value) = line.trim().split_once('=')?;

    match key {
        "out_time_us" | "out_time_ms" => {
            // Both keys carry microseconds in current FFmpeg releases.
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(speed) = value.trim().strip_suffix('x').and_then(|s| s.parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            if value == "end" {
                current.is_complete = true;
            }
            return Some(current.clone());
        }
        _ => {}
    }

    None
}

/// Whether a stderr line belongs to the `-progress` stream.
pub(crate) fn is_progress_line(line: &str) -> bool {
    const KEYS: &[&str] = &[
        "frame", "fps", "stream_", "bitrate", "total_size", "out_time", "dup_frames",
        "drop_frames", "speed", "progress",
    ];
    match line.trim().split_once('=') {
        Some((key, _)) => KEYS.iter().any(|k| key.starts_with(k)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        assert!(parse_progress_line("out_time_us=5000000", &mut progress).is_none());
        assert_eq!(progress.out_time_ms, 5000);

        parse_progress_line("speed=1.5x", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        parse_progress_line("speed=N/A", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        let snapshot = parse_progress_line("progress=continue", &mut progress).unwrap();
        assert!(!snapshot.is_complete);

        let snapshot = parse_progress_line("progress=end", &mut progress).unwrap();
        assert!(snapshot.is_complete);
    }

    #[test]
    fn test_percent_of() {
        let progress = FfmpegProgress {
            out_time_ms: 15_000,
            ..Default::default()
        };
        assert_eq!(progress.percent_of(30.0), 50);
        assert_eq!(progress.percent_of(10.0), 100);
        assert_eq!(progress.percent_of(0.0), 0);

        let done = FfmpegProgress {
            is_complete: true,
            ..Default::default()
        };
        assert_eq!(done.percent_of(30.0), 100);
    }

    #[test]
    fn test_eta() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            speed: 2.0,
            ..Default::default()
        };
        let eta = progress.eta_seconds(10.0).unwrap();
        assert!((eta - 2.5).abs() < 0.01);
        assert!(FfmpegProgress::default().eta_seconds(10.0).is_none());
    }

    #[test]
    fn test_is_progress_line() {
        assert!(is_progress_line("out_time=00:00:01.000000"));
        assert!(is_progress_line("stream_0_0_q=28.0"));
        assert!(!is_progress_line("[libx264 @ 0x55] error while encoding"));
        assert!(!is_progress_line("Conversion failed!"));
    }
}

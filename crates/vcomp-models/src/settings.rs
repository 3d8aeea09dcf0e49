//! Compression settings captured once per batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};

/// Default target size in megabytes
pub const DEFAULT_TARGET_SIZE_MB: f64 = 10.0;
/// Default suffix appended to the output file stem
pub const DEFAULT_SUFFIX: &str = "_compressed";

/// Encoder speed/quality tradeoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Faster encode, slightly lower quality per bit
    #[default]
    Fast,
    /// Slower encode, better quality per bit
    Balanced,
}

impl Preset {
    /// The x264 preset name passed to the encoder.
    pub fn encoder_preset(&self) -> &'static str {
        match self {
            Preset::Fast => "faster",
            Preset::Balanced => "medium",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Fast => "fast",
            Preset::Balanced => "balanced",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Preset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "faster" => Ok(Preset::Fast),
            "balanced" | "medium" => Ok(Preset::Balanced),
            other => Err(ModelError::UnknownPreset(other.to_string())),
        }
    }
}

/// Immutable settings snapshot for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionSettings {
    /// Desired output size in megabytes
    pub target_size_mb: f64,
    /// Appended to the output file stem
    pub suffix: String,
    /// Output directory; the source directory is used when unset
    pub output_dir: Option<PathBuf>,
    /// Encoder preset
    pub preset: Preset,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            target_size_mb: DEFAULT_TARGET_SIZE_MB,
            suffix: DEFAULT_SUFFIX.to_string(),
            output_dir: None,
            preset: Preset::default(),
        }
    }
}

impl CompressionSettings {
    /// Build settings from raw user input.
    ///
    /// An empty suffix falls back to [`DEFAULT_SUFFIX`].
    pub fn from_input(
        target_size: &str,
        suffix: &str,
        output_dir: Option<PathBuf>,
        preset: Preset,
    ) -> ModelResult<Self> {
        let settings = Self {
            target_size_mb: parse_target_size(target_size)?,
            suffix: suffix.to_string(),
            output_dir,
            preset,
        }
        .with_default_suffix();
        Ok(settings)
    }

    /// Check that the target size is a finite positive number.
    pub fn validate(&self) -> ModelResult<()> {
        if !self.target_size_mb.is_finite() || self.target_size_mb <= 0.0 {
            return Err(ModelError::invalid_settings(format!(
                "target size must be a positive number of megabytes, got {}",
                self.target_size_mb
            )));
        }
        Ok(())
    }

    /// Replace an empty suffix with the default one.
    pub fn with_default_suffix(mut self) -> Self {
        if self.suffix.is_empty() {
            self.suffix = DEFAULT_SUFFIX.to_string();
        }
        self
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Target size in bytes.
    pub fn target_size_bytes(&self) -> u64 {
        (self.target_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Parse a target size in megabytes from user text.
pub fn parse_target_size(input: &str) -> ModelResult<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ModelError::invalid_settings(format!("invalid size: {:?}", input)))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::invalid_settings(format!(
            "target size must be positive, got {}",
            value
        )));
    }
    Ok(value)
}

//! Model validation errors.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

impl ModelError {
    pub fn invalid_settings(msg: impl Into<String>) -> Self {
        Self::InvalidSettings(msg.into())
    }
}

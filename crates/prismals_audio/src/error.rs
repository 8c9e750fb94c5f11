//! # Audio Error Types

use prismals_core::CoreError;
use thiserror::Error;

/// Errors raised while setting up or updating audio.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// A world instance referenced an unregistered prototype.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Audio settings that cannot be honored.
    #[error("invalid audio config: {0}")]
    InvalidConfig(String),
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

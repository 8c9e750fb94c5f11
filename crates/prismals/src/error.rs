//! # Host Error Types

use prismals_audio::AudioError;
use prismals_core::{ConfigError, CoreError};
use prismals_rendering::RenderError;
use thiserror::Error;

/// Anything that stops the game loop.
#[derive(Error, Debug)]
pub enum HostError {
    /// The scene directory could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A referential error in the model or an unresolved schedule.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Batching or GPU submission failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Audio setup or tracing failed.
    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

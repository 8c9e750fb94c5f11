//! # Rendering Error Types

use prismals_core::CoreError;
use thiserror::Error;

/// Errors that can occur while batching or submitting a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// An instance referenced a prototype that was never registered.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The GPU layer rejected a request.
    #[error("backend failure on {slot}: {reason}")]
    Backend {
        /// Buffer slot being operated on.
        slot: String,
        /// Description from the backend.
        reason: String,
    },

    /// A draw was issued for a slot that has no buffer yet.
    #[error("no buffer allocated for {0}")]
    MissingBuffer(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

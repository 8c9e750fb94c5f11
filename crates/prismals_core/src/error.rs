//! # Core Error Types
//!
//! Referential and scheduling errors raised by the entity model.

use thiserror::Error;

use crate::entity::PrototypeId;

/// Errors that can occur while operating on prototypes, worlds and schedules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An instance or payload referenced a prototype id that was never registered.
    #[error("unknown prototype id {id} (registry holds {len} prototypes)")]
    UnknownPrototype {
        /// The offending id.
        id: PrototypeId,
        /// Number of registered prototypes at the time of lookup.
        len: usize,
    },

    /// A name lookup found no prototype.
    #[error("unknown prototype name: {0}")]
    UnknownPrototypeName(String),

    /// Two prototypes were registered under the same name.
    #[error("duplicate prototype name: {0}")]
    DuplicatePrototypeName(String),

    /// The level holds no worlds, so there is nothing to make active.
    #[error("level has no worlds")]
    NoActiveWorld,

    /// The system schedule failed validation.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

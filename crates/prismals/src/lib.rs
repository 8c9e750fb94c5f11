//! # PRISMALS
//!
//! The host crate: owns every context and drives one tick at a time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              PRISMALS                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │ prismals_core   │     │ prismals_       │     │ prismals_audio  │   │
//! │  │                 │────>│ rendering       │     │                 │   │
//! │  │ • Prototypes    │     │ • Behaviors     │     │ • Pink noise    │   │
//! │  │ • Worlds        │     │ • Batcher       │     │ • Occlusion     │   │
//! │  │ • Audicles      │     │ • Sky           │     │ • Visualizer    │   │
//! │  │ • Scene files   │     │                 │     │                 │   │
//! │  └────────┬────────┘     └────────┬────────┘     └────────┬────────┘   │
//! │           │                       │                       │            │
//! │           │              ┌────────┴────────┐              │            │
//! │           └─────────────>│   GameLoop      │<─────────────┘            │
//! │                          │   (schedule)    │                           │
//! │                          └─────────────────┘                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `game_loop`: context ownership and the per-tick step runner
//! - `stats`: frame statistics
//! - `error`: the host error aggregate

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod game_loop;
pub mod stats;

// Re-export the layers
pub use prismals_audio as audio;
pub use prismals_core as core;
pub use prismals_rendering as rendering;

pub use error::{HostError, HostResult};
pub use game_loop::{GameLoop, GameLoopOptions, TesseractOverlay};
pub use stats::{FrameStats, FrameStatsAccumulator};

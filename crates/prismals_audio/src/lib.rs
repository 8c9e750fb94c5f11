//! # PRISMALS Audio
//!
//! A single pink-noise source whose timbre and loudness follow what lies
//! between the listener and the `AudioVisualizer` instance in the world.
//!
//! ## Threads
//!
//! ```text
//!  game thread                              audio callback
//! ─────────────                            ────────────────
//! OcclusionTracer ─┐                       AudioRenderer::fill_block
//!                  ▼                              │
//! AudioVisualizer ──set_source──> AudioShared <───┤ (Mutex: params)
//!        ▲                           │            │
//!        └──────drain_peak────── ring (2048) <────┘ try_send(first sample)
//! ```
//!
//! The callback never blocks on the ring and the game thread never waits
//! for the callback.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod occlusion;
pub mod pink_noise;
pub mod renderer;
pub mod shared;
pub mod visualizer;

pub use error::{AudioError, AudioResult};
pub use occlusion::{OcclusionGrid, OcclusionTracer, AIR_DAMPING, DAMPING_FALLOFF};
pub use pink_noise::{PinkNoise, ALPHA_OCCLUDED, ALPHA_OPEN, PINK_NOISE_OCTAVES};
pub use renderer::AudioRenderer;
pub use shared::{AudioShared, GeneratorState, SourceState};
pub use visualizer::{AudioVisualizer, VISUALIZER_NAME};

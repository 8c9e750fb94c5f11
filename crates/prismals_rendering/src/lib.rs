//! # PRISMALS Rendering
//!
//! Turns the instance lists of every world into a handful of instanced draw
//! calls, and computes the sky for the current time of day.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FRAME                                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Level (all worlds) → classify → 5 behavior buckets + stars  │
//! │        ↓                                  ↓                  │
//! │  SkyGradient + CelestialState     InstanceBackend            │
//! │        ↓                       (grow → upload → draw)        │
//! │  FrameUniforms ─────────────────────────→ RenderFrame        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The GPU is reached only through [`InstanceBackend`], which needs three
//! capabilities: grow a per-bucket buffer, upload packed records, and issue
//! an instanced draw.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod atmosphere;
pub mod error;
pub mod instancing;
pub mod pipeline;

pub use atmosphere::{day_fraction, CelestialBody, CelestialState, SkyColors, SkyGradient, SkyKey};
pub use error::{RenderError, RenderResult};
pub use instancing::{
    BackendCall, BehaviorBuckets, BehaviorPipelines, BranchInstanceRecord, BufferSlot, DrawCall,
    DrawKind, InstanceBackend, InstanceBatcher, InstanceRecord, RecordingBackend, RenderBehavior,
    StarRecord, Visibility, WgpuInstanceBackend, CUBE_VERTEX_COUNT,
};
pub use pipeline::{FrameUniforms, RenderFrame, RenderPipeline, RenderStats};

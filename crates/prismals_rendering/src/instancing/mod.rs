//! Behavior-bucketed instanced rendering.
//!
//! Every frame the batcher walks all worlds, sorts visible instances into
//! one bucket per [`RenderBehavior`] plus a star point list, and submits one
//! draw per non-empty bucket through an [`InstanceBackend`].
//!
//! ## Key Concepts
//!
//! - **Bucket**: staging `Vec` of packed records for one behavior
//! - **Slot**: the GPU buffer a bucket uploads into ([`BufferSlot`])
//! - **Backend**: grows buffers, uploads bytes, issues draws

mod backend;
mod batcher;
mod behavior;
mod buffer;
mod instance_data;
mod wgpu_backend;

pub use backend::{BackendCall, DrawCall, DrawKind, InstanceBackend, RecordingBackend};
pub use batcher::InstanceBatcher;
pub use behavior::{RenderBehavior, Visibility};
pub use buffer::{BehaviorBuckets, BufferSlot};
pub use instance_data::{BranchInstanceRecord, InstanceRecord, StarRecord};
pub use wgpu_backend::{BehaviorPipelines, WgpuInstanceBackend};

/// Vertices in one unit cube (12 triangles).
pub const CUBE_VERTEX_COUNT: u32 = 36;

//! Per-instance records for GPU upload.
//!
//! The cube geometry itself is generated in the vertex shader from the
//! vertex index, so the instance buffer is the only vertex buffer bound.
//! Attribute locations start at 3 to leave 0..=2 for per-vertex data.

use bytemuck::{Pod, Zeroable};
use prismals_core::EntityInstance;

/// Position and color of one block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    /// World position.
    pub position: [f32; 3],
    /// RGB color.
    pub color: [f32; 3],
}

impl InstanceRecord {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Instance attribute layout.
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        3 => Float32x3,  // position
        4 => Float32x3,  // color
    ];

    /// Vertex buffer layout descriptor
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<&EntityInstance> for InstanceRecord {
    fn from(inst: &EntityInstance) -> Self {
        Self {
            position: inst.position.to_array(),
            color: inst.color.to_array(),
        }
    }
}

/// Position, Y rotation and color of one branch block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BranchInstanceRecord {
    /// World position.
    pub position: [f32; 3],
    /// Rotation about Y.
    pub rotation: f32,
    /// RGB color.
    pub color: [f32; 3],
}

impl BranchInstanceRecord {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Instance attribute layout.
    pub const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        3 => Float32x3,  // position
        4 => Float32,    // rotation
        5 => Float32x3,  // color
    ];

    /// Vertex buffer layout descriptor
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<&EntityInstance> for BranchInstanceRecord {
    fn from(inst: &EntityInstance) -> Self {
        Self {
            position: inst.position.to_array(),
            rotation: inst.rotation,
            color: inst.color.to_array(),
        }
    }
}

/// One point of the star cloud.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct StarRecord {
    /// Position on the sky dome.
    pub position: [f32; 3],
}

impl StarRecord {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Per-vertex attribute layout (stars are drawn as a point list).
    pub const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    /// Vertex buffer layout descriptor
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(InstanceRecord::SIZE, 24);
        assert_eq!(BranchInstanceRecord::SIZE, 28);
        assert_eq!(StarRecord::SIZE, 12);
    }

    #[test]
    fn test_layouts_step_per_instance() {
        assert_eq!(InstanceRecord::desc().step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(BranchInstanceRecord::desc().attributes.len(), 3);
        assert_eq!(BranchInstanceRecord::ATTRIBS[2].offset, 16);
        assert_eq!(StarRecord::desc().step_mode, wgpu::VertexStepMode::Vertex);
    }
}

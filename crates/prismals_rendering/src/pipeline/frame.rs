//! Render frame data structures.
//!
//! Contains everything besides instance buffers that a frame needs.

use bytemuck::{Pod, Zeroable};
use prismals_core::{Mat4, Vec3};

use super::RenderStats;
use crate::atmosphere::{CelestialState, SkyColors};

/// Block shader uniforms (group 0, binding 0).
///
/// Field order and padding match the WGSL `Frame` struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// View matrix, column-major.
    pub view: [[f32; 4]; 4],
    /// Projection matrix, column-major.
    pub projection: [[f32; 4]; 4],
    /// Eye position.
    pub camera_pos: [f32; 3],
    /// Seconds since start, drives the animated behaviors.
    pub time: f32,
    /// Direction towards the key light.
    pub light_dir: [f32; 3],
    /// Ambient term.
    pub ambient: f32,
    /// Diffuse term.
    pub diffuse: f32,
    _padding: [f32; 3],
}

impl FrameUniforms {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Ambient light strength.
    pub const AMBIENT: f32 = 0.4;

    /// Diffuse light strength.
    pub const DIFFUSE: f32 = 0.6;

    /// Creates uniforms with the standard lighting terms.
    #[must_use]
    pub fn new(view: &Mat4, projection: &Mat4, camera_pos: Vec3, time: f32, light_dir: Vec3) -> Self {
        Self {
            view: view.cols,
            projection: projection.cols,
            camera_pos: camera_pos.to_array(),
            time,
            light_dir: light_dir.to_array(),
            ambient: Self::AMBIENT,
            diffuse: Self::DIFFUSE,
            _padding: [0.0; 3],
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(&Mat4::IDENTITY, &Mat4::IDENTITY, Vec3::ZERO, 0.0, Vec3::Y)
    }
}

/// Everything produced for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderFrame {
    /// Block shader uniforms.
    pub uniforms: FrameUniforms,
    /// Skybox colors.
    pub sky: SkyColors,
    /// Sun and moon.
    pub celestial: CelestialState,
    /// Submission statistics.
    pub stats: RenderStats,
}

impl RenderFrame {
    /// Returns the uniforms as bytes.
    #[must_use]
    pub fn uniform_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniforms)
    }

    /// Returns true if there's anything to render besides the sky.
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.stats.has_content()
    }

    /// Billboard centers of the visible bodies.
    pub fn billboards(&self) -> impl Iterator<Item = Vec3> + '_ {
        let eye = Vec3::from_array(self.uniforms.camera_pos);
        self.celestial
            .visible_bodies()
            .map(move |body| body.billboard_position(eye))
    }
}

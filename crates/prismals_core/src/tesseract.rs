//! # Tesseract
//!
//! A 4D hypercube rotated in the XW, YW and ZW planes and projected to 3D.
//! One-shot `TESS_*` events nudge the target angles by a quarter turn; the
//! displayed angles ease toward their targets every tick.

use std::f32::consts::FRAC_PI_2;

use crate::entity::AudicleKind;
use crate::error::CoreResult;
use crate::math::{Mat4, Vec3, Vec4};
use crate::registry::PrototypeRegistry;
use crate::world::World;

/// Easing rate toward target angles, per second.
pub const EASE_RATE: f32 = 5.0;

/// Distance of the 4D viewer from the origin along W.
pub const VIEWER_DISTANCE: f32 = 4.0;

/// Uniform scale of the on-screen overlay.
pub const OVERLAY_SCALE: f32 = 20.0;

/// Line list over the 16 vertices: 32 edges, 64 indices.
pub const EDGE_INDICES: [u32; 64] = [
    0, 1, 1, 3, 3, 2, 2, 0, 4, 5, 5, 7, 7, 6, 6, 4, 0, 4, 1, 5, 2, 6, 3, 7, 8, 9, 9, 11, 11, 10,
    10, 8, 12, 13, 13, 15, 15, 14, 14, 12, 8, 12, 9, 13, 10, 14, 11, 15, 0, 8, 1, 9, 2, 10, 3,
    11, 4, 12, 5, 13, 6, 14, 7, 15,
];

/// Overlay line color.
pub const LINE_COLOR: Vec3 = Vec3::new(0.8, 0.1, 0.3);

/// Hypercube rotation state.
#[derive(Clone, Debug)]
pub struct Tesseract {
    vertices: [Vec4; 16],
    /// Current XW, YW, ZW angles in radians.
    pub angles: [f32; 3],
    /// Target XW, YW, ZW angles in radians.
    pub targets: [f32; 3],
}

impl Default for Tesseract {
    fn default() -> Self {
        Self::new()
    }
}

impl Tesseract {
    /// Unit hypercube with every vertex at ±1 on each axis.
    #[must_use]
    pub fn new() -> Self {
        let sign = |bit: usize, i: usize| if i & bit == 0 { -1.0 } else { 1.0 };
        let vertices = std::array::from_fn(|i| Vec4::new(sign(1, i), sign(2, i), sign(4, i), sign(8, i)));
        Self {
            vertices,
            angles: [0.0; 3],
            targets: [0.0; 3],
        }
    }

    /// The 4D vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Vec4; 16] {
        &self.vertices
    }

    /// True if the world holds an instance of a tesseract-flagged prototype.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownPrototype`] for unknown ids.
    pub fn is_present(world: &World, registry: &PrototypeRegistry) -> CoreResult<bool> {
        for inst in &world.instances {
            if registry.get(inst.prototype)?.is_tesseract {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Applies `TESS_*` events from `world`, then eases the angles.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownPrototype`] for unknown ids.
    pub fn update(&mut self, world: &World, registry: &PrototypeRegistry, dt: f32) -> CoreResult<()> {
        for inst in &world.instances {
            let proto = registry.get(inst.prototype)?;
            if proto.audicle != AudicleKind::OneShot {
                continue;
            }
            let (plane, sign) = match proto.name.as_str() {
                "TESS_FORWARD" => (0, 1.0),
                "TESS_BACKWARD" => (0, -1.0),
                "TESS_UP" => (1, 1.0),
                "TESS_DOWN" => (1, -1.0),
                "TESS_LEFT" => (2, 1.0),
                "TESS_RIGHT" => (2, -1.0),
                _ => continue,
            };
            self.targets[plane] += sign * FRAC_PI_2;
        }

        for (angle, target) in self.angles.iter_mut().zip(self.targets) {
            *angle += (target - *angle) * EASE_RATE * dt;
        }
        Ok(())
    }

    /// Composite rotation `R_xw * R_yw * R_zw`.
    #[must_use]
    pub fn rotation(&self) -> Mat4 {
        let [xw, yw, zw] = self.angles;
        Mat4::plane_rotation(xw, 0, 3)
            .mul(&Mat4::plane_rotation(yw, 1, 3))
            .mul(&Mat4::plane_rotation(zw, 2, 3))
    }

    /// Rotates every vertex and projects it to 3D.
    #[must_use]
    pub fn project(&self) -> [Vec3; 16] {
        let rotation = self.rotation();
        std::array::from_fn(|i| {
            let v = rotation.mul_vec4(self.vertices[i]);
            let w = 1.0 / (VIEWER_DISTANCE - v.w);
            Vec3::new(v.x * w, v.y * w, v.z * w)
        })
    }

    /// Model matrix that pins the overlay to the camera.
    #[must_use]
    pub fn model_matrix(view: &Mat4, aspect: f32) -> Mat4 {
        view.rigid_inverse()
            .mul(&Mat4::from_scale(Vec3::new(OVERLAY_SCALE * aspect, OVERLAY_SCALE, OVERLAY_SCALE)))
    }
}

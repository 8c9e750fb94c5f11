//! # Camera and UAV Movement
//!
//! Free-flying camera: yaw/pitch in degrees, driven by mouse deltas and by
//! the gated `UAV_*` event instances the keyboard system emits.

use crate::entity::AudicleKind;
use crate::error::CoreResult;
use crate::math::{Mat4, Vec3};
use crate::registry::PrototypeRegistry;
use crate::world::World;

/// Degrees of rotation per pixel of mouse travel.
pub const MOUSE_SENSITIVITY: f32 = 0.1;

/// Pitch limit in degrees; keeps the view from flipping over the poles.
pub const PITCH_LIMIT: f32 = 89.0;

/// UAV travel speed in units per second.
pub const UAV_SPEED: f32 = 5.0;

/// Position, orientation and lens of the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// Eye position.
    pub position: Vec3,
    /// Heading in degrees; -90 looks down -Z.
    pub yaw: f32,
    /// Elevation in degrees, clamped to [`PITCH_LIMIT`].
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::new(6.0, 5.0, 15.0),
            yaw: -90.0,
            pitch: 0.0,
            fov_y: 103.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl CameraState {
    /// Applies a mouse delta (y grows upward).
    pub fn apply_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch + dy * MOUSE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Unit view direction.
    #[must_use]
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    /// View direction projected onto the ground plane.
    #[must_use]
    pub fn flat_front(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        Vec3::new(yaw.cos(), 0.0, yaw.sin())
    }

    /// Ground-plane right vector.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.flat_front().cross(Vec3::Y).normalize()
    }

    /// World-to-view transform.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y)
    }

    /// Perspective projection for the given aspect ratio.
    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.near, self.far)
    }
}

/// Moves the camera from gated `UAV_*` events.
///
/// Must run before the audicle pass, which retires the events.
#[derive(Clone, Copy, Debug, Default)]
pub struct UavMovement {
    speed: f32,
}

impl UavMovement {
    /// Movement at [`UAV_SPEED`].
    #[must_use]
    pub const fn new() -> Self {
        Self { speed: UAV_SPEED }
    }

    /// Overrides the travel speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Moves `camera` once per gated UAV event in `world`.
    ///
    /// Returns true if the camera moved.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownPrototype`] for unknown ids.
    pub fn apply(
        &self,
        world: &World,
        registry: &PrototypeRegistry,
        camera: &mut CameraState,
        dt: f32,
    ) -> CoreResult<bool> {
        let step = self.speed * dt;
        let front = camera.flat_front();
        let right = camera.right();
        let mut moved = false;

        for inst in &world.instances {
            let proto = registry.get(inst.prototype)?;
            if proto.audicle != AudicleKind::Gated {
                continue;
            }
            let delta = match proto.name.as_str() {
                "UAV_W" => front * step,
                "UAV_S" => -(front * step),
                "UAV_A" => -(right * step),
                "UAV_D" => right * step,
                "UAV_SPACE" => Vec3::Y * step,
                "UAV_LSHIFT" => -(Vec3::Y * step),
                _ => continue,
            };
            camera.position += delta;
            moved = true;
        }

        Ok(moved)
    }
}

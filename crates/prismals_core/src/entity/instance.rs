//! Entity instances - placed occurrences of a prototype.

use std::fmt;

use crate::entity::PrototypeId;
use crate::math::Vec3;

/// Bright magenta, so instances nobody colored are obvious on screen.
pub const DEBUG_COLOR: Vec3 = Vec3::new(1.0, 0.0, 1.0);

/// Process-unique identifier of an instance.
///
/// Issued by a single monotonically increasing counter and never reused,
/// so removal by id is unambiguous even for instances sharing a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A placed occurrence of a prototype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityInstance {
    /// Unique id.
    pub id: InstanceId,
    /// Foreign key into the prototype registry.
    pub prototype: PrototypeId,
    /// World-space position.
    pub position: Vec3,
    /// Y-axis rotation, used by branch blocks only.
    pub rotation: f32,
    /// RGB color.
    pub color: Vec3,
}

/// One entry of a spawner payload: "put this prototype here".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceTemplate {
    /// Prototype to instantiate.
    pub prototype: PrototypeId,
    /// Position of the spawned instance (not the spawner's position).
    pub position: Vec3,
    /// Rotation of the spawned instance.
    pub rotation: f32,
    /// Color of the spawned instance.
    pub color: Vec3,
}

impl InstanceTemplate {
    /// Creates a template with zero rotation.
    #[must_use]
    pub const fn new(prototype: PrototypeId, position: Vec3, color: Vec3) -> Self {
        Self {
            prototype,
            position,
            rotation: 0.0,
            color,
        }
    }

    /// Sets the rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

//! # Instance Factory
//!
//! The only place instance ids come from. The counter starts at zero when
//! the factory is created and only moves forward.

use crate::entity::{EntityInstance, InstanceId, InstanceTemplate, PrototypeId};
use crate::math::Vec3;

/// Issues unique instance ids and stamps out new instances.
#[derive(Debug, Default)]
pub struct InstanceFactory {
    next_id: u64,
}

impl InstanceFactory {
    /// Creates a factory whose first id is 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Creates an instance of `prototype` at `position` with `color`.
    ///
    /// The returned id is strictly greater than every id issued before.
    #[inline]
    pub fn create(&mut self, prototype: PrototypeId, position: Vec3, color: Vec3) -> EntityInstance {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        EntityInstance {
            id,
            prototype,
            position,
            rotation: 0.0,
            color,
        }
    }

    /// Creates an instance from a payload template, rotation included.
    #[inline]
    pub fn create_from(&mut self, template: &InstanceTemplate) -> EntityInstance {
        let mut instance = self.create(template.prototype, template.position, template.color);
        instance.rotation = template.rotation;
        instance
    }

    /// Number of ids issued so far.
    #[inline]
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DEBUG_COLOR;

    #[test]
    fn test_ids_strictly_increasing() {
        let mut factory = InstanceFactory::new();
        let ids: Vec<InstanceId> = (0..1000)
            .map(|i| factory.create(PrototypeId(i % 7), Vec3::ZERO, DEBUG_COLOR).id)
            .collect();

        assert_eq!(ids[0], InstanceId(0));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(factory.issued(), 1000);
    }

    #[test]
    fn test_same_position_distinct_ids() {
        let mut factory = InstanceFactory::new();
        let a = factory.create(PrototypeId(0), Vec3::splat(1.0), DEBUG_COLOR);
        let b = factory.create(PrototypeId(0), Vec3::splat(1.0), DEBUG_COLOR);
        assert_eq!(a.position, b.position);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_create_from_copies_template() {
        let mut factory = InstanceFactory::new();
        let template = InstanceTemplate::new(PrototypeId(3), Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5))
            .with_rotation(45.0);
        let inst = factory.create_from(&template);
        assert_eq!(inst.prototype, PrototypeId(3));
        assert_eq!(inst.position, template.position);
        assert_eq!(inst.color, template.color);
        assert!((inst.rotation - 45.0).abs() < f32::EPSILON);
    }
}
